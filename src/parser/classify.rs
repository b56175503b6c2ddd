use crate::model::{Dimensions, ProductDraft};
use crate::parser::fields;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Height,
    Width,
    Diameter,
    /// A generic "dimensions" label with no single axis.
    Unspecified,
}

/// Canonical attribute a label refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTag {
    Name,
    Description,
    Material,
    Weight,
    Capacity,
    Color,
    Sku,
    Recycled,
    Dimension(Axis),
}

struct Rule {
    keywords: &'static [&'static str],
    tag: FieldTag,
}

// Order matters: the first rule with a keyword contained in the label wins.
const RULES: &[Rule] = &[
    Rule { keywords: &["name", "product", "item", "title"], tag: FieldTag::Name },
    Rule { keywords: &["description", "desc", "details"], tag: FieldTag::Description },
    Rule { keywords: &["material"], tag: FieldTag::Material },
    Rule { keywords: &["weight", "mass"], tag: FieldTag::Weight },
    Rule { keywords: &["capacity", "volume", "size"], tag: FieldTag::Capacity },
    Rule { keywords: &["color", "colour"], tag: FieldTag::Color },
    Rule { keywords: &["sku", "code", "ref"], tag: FieldTag::Sku },
    Rule { keywords: &["recycle", "recycled"], tag: FieldTag::Recycled },
    Rule { keywords: &["height"], tag: FieldTag::Dimension(Axis::Height) },
    Rule { keywords: &["width"], tag: FieldTag::Dimension(Axis::Width) },
    Rule { keywords: &["diameter"], tag: FieldTag::Dimension(Axis::Diameter) },
    Rule { keywords: &["dimension"], tag: FieldTag::Dimension(Axis::Unspecified) },
];

pub fn classify(label: &str) -> Option<FieldTag> {
    first_match(RULES.iter(), label)
}

/// Classify the label of a product page's spec row. The page heading
/// already names the product, so the name and description rules are
/// skipped and "Product Material" or "Item Code" reach their attribute.
pub fn classify_spec_label(label: &str) -> Option<FieldTag> {
    first_match(
        RULES
            .iter()
            .filter(|rule| !matches!(rule.tag, FieldTag::Name | FieldTag::Description)),
        label,
    )
}

fn first_match<'a>(mut rules: impl Iterator<Item = &'a Rule>, label: &str) -> Option<FieldTag> {
    let lower = label.to_lowercase();
    rules
        .find(|rule| rule.keywords.iter().any(|kw| lower.contains(kw)))
        .map(|rule| rule.tag)
}

/// Route one cell value into the draft field its tag names.
/// Values the matching parser cannot read leave the draft untouched.
pub fn apply(tag: FieldTag, value: &str, draft: &mut ProductDraft) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }

    match tag {
        FieldTag::Name => draft.name = Some(value.to_string()),
        FieldTag::Description => draft.description = Some(value.to_string()),
        FieldTag::Material => draft.material = Some(value.to_string()),
        FieldTag::Color => draft.color = Some(value.to_string()),
        FieldTag::Sku => draft.sku = Some(value.to_string()),
        FieldTag::Weight => {
            if let Some(w) = fields::parse_weight(value) {
                draft.weight = Some(w);
            }
        }
        FieldTag::Capacity => {
            if let Some(c) = fields::parse_capacity(value) {
                draft.capacity = Some(c);
            }
        }
        FieldTag::Recycled => {
            if let Some(p) = fields::parse_percentage(value) {
                draft.recycled_content = Some(p);
            }
        }
        FieldTag::Dimension(Axis::Unspecified) => {}
        FieldTag::Dimension(axis) => {
            let Some(n) = fields::parse_number(value) else {
                return;
            };
            let dims = draft.dimensions.get_or_insert_with(Dimensions::default);
            match axis {
                Axis::Height => dims.height = Some(n),
                Axis::Width => dims.width = Some(n),
                Axis::Diameter => dims.diameter = Some(n),
                Axis::Unspecified => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CapacityUnit;

    #[test]
    fn basic_labels() {
        assert_eq!(classify("Name"), Some(FieldTag::Name));
        assert_eq!(classify("Material"), Some(FieldTag::Material));
        assert_eq!(classify("Net Weight (g)"), Some(FieldTag::Weight));
        assert_eq!(classify("Volume"), Some(FieldTag::Capacity));
        assert_eq!(classify("Colour"), Some(FieldTag::Color));
        assert_eq!(classify("SKU"), Some(FieldTag::Sku));
        assert_eq!(classify("Recycled %"), Some(FieldTag::Recycled));
        assert_eq!(classify("Height (mm)"), Some(FieldTag::Dimension(Axis::Height)));
        assert_eq!(classify("Dimensions"), Some(FieldTag::Dimension(Axis::Unspecified)));
        assert_eq!(classify("Price"), None);
    }

    #[test]
    fn first_rule_wins() {
        // "product" is a name keyword and comes before "description"
        assert_eq!(classify("Product Description"), Some(FieldTag::Name));
        // "item" before "code"
        assert_eq!(classify("Item Code"), Some(FieldTag::Name));
        // "colour" before "code"
        assert_eq!(classify("Colour Code"), Some(FieldTag::Color));
        assert_eq!(classify("Bottle Size"), Some(FieldTag::Capacity));
    }

    #[test]
    fn spec_labels_skip_name_and_description() {
        assert_eq!(classify_spec_label("Item Code"), Some(FieldTag::Sku));
        assert_eq!(classify_spec_label("Product Material"), Some(FieldTag::Material));
        assert_eq!(classify_spec_label("Product Weight"), Some(FieldTag::Weight));
        assert_eq!(classify_spec_label("Product Colour"), Some(FieldTag::Color));
        assert_eq!(classify_spec_label("Product Title"), None);
        assert_eq!(classify_spec_label("Details"), None);
    }

    #[test]
    fn apply_routes_through_parsers() {
        let mut draft = ProductDraft::default();
        apply(FieldTag::Capacity, "750", &mut draft);
        apply(FieldTag::Recycled, "30%", &mut draft);
        apply(FieldTag::Dimension(Axis::Height), "120 mm", &mut draft);
        apply(FieldTag::Dimension(Axis::Unspecified), "120 x 60 mm", &mut draft);
        apply(FieldTag::Weight, "n/a", &mut draft);

        let cap = draft.capacity.unwrap();
        assert_eq!((cap.value, cap.unit), (750.0, CapacityUnit::Ml));
        assert_eq!(draft.recycled_content, Some(30.0));
        assert_eq!(draft.dimensions.as_ref().unwrap().height, Some(120.0));
        assert_eq!(draft.dimensions.as_ref().unwrap().width, None);
        assert!(draft.weight.is_none());
    }
}
