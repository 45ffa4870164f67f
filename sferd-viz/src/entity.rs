//! What each emitter shows for one object

use sferd_core::{DiagramOptions, FieldDef, FieldScope, ObjectCategory, ObjectNode};

/// Fill color per object category
#[must_use]
pub const fn category_color(category: ObjectCategory) -> &'static str {
    match category {
        ObjectCategory::Standard => "#E1F5FE",
        ObjectCategory::Custom => "#FFF9C4",
        ObjectCategory::Managed => "#FFE0B2",
    }
}

/// Fields picked for display plus how many were cut
#[derive(Debug)]
pub struct EntityView<'a> {
    pub object: &'a ObjectNode,
    pub fields: Vec<&'a FieldDef>,
    /// Eligible fields left out by the field limit
    pub hidden: usize,
}

impl<'a> EntityView<'a> {
    /// Apply scope and limit to `object`.
    #[must_use]
    pub fn new(object: &'a ObjectNode, options: &DiagramOptions, limit: Option<usize>) -> Self {
        if !options.show_fields {
            return Self {
                object,
                fields: Vec::new(),
                hidden: 0,
            };
        }

        let eligible: Vec<&FieldDef> = match options.field_scope {
            FieldScope::Relationships => object.relationship_fields().collect(),
            FieldScope::All => object.fields.iter().collect(),
        };

        let shown = limit.map_or(eligible.len(), |l| l.min(eligible.len()));
        Self {
            object,
            hidden: eligible.len() - shown,
            fields: eligible.into_iter().take(shown).collect(),
        }
    }

    /// Whether `field` has its own row (and so a port/anchor)
    #[must_use]
    pub fn shows(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.name == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice() -> ObjectNode {
        ObjectNode::new("Invoice__c", "Invoice", vec![
            FieldDef::new("Amount__c", "Currency"),
            FieldDef::new("Account__c", "MasterDetail").referencing("Account"),
            FieldDef::new("Contact__c", "Lookup").referencing("Contact"),
            FieldDef::new("Owner__c", "Lookup").referencing("User"),
        ])
    }

    #[test]
    fn test_relationship_scope() {
        let object = invoice();
        let view = EntityView::new(&object, &DiagramOptions::default(), None);
        let names: Vec<_> = view.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Account__c", "Contact__c", "Owner__c"]);
        assert_eq!(view.hidden, 0);
    }

    #[test]
    fn test_limit_counts_hidden() {
        let object = invoice();
        let view = EntityView::new(&object, &DiagramOptions::default(), Some(1));
        assert_eq!(view.fields.len(), 1);
        assert_eq!(view.hidden, 2);
        assert!(view.shows("Account__c"));
        assert!(!view.shows("Owner__c"));
    }

    #[test]
    fn test_all_scope_and_hidden_fields() {
        let object = invoice();
        let all = DiagramOptions {
            field_scope: FieldScope::All,
            ..DiagramOptions::default()
        };
        assert_eq!(EntityView::new(&object, &all, None).fields.len(), 4);

        let hidden = DiagramOptions {
            show_fields: false,
            ..DiagramOptions::default()
        };
        let view = EntityView::new(&object, &hidden, Some(1));
        assert!(view.fields.is_empty());
        assert_eq!(view.hidden, 0);
    }

    #[test]
    fn test_category_colors() {
        assert_eq!(category_color(ObjectCategory::Standard), "#E1F5FE");
        assert_eq!(category_color(ObjectCategory::Custom), "#FFF9C4");
        assert_eq!(category_color(ObjectCategory::Managed), "#FFE0B2");
    }
}
