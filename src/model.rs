use std::fmt::Display;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

pub const SUPPLIER_TYPE: &str = "Packaging";
pub const UNKNOWN_COMPANY: &str = "Unknown Company";

// ── Measurements ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    G,
    Kg,
}

impl WeightUnit {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "g" | "gram" | "grams" => Some(Self::G),
            "kg" | "kilogram" | "kilograms" => Some(Self::Kg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityUnit {
    Ml,
    L,
    Oz,
}

impl CapacityUnit {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => Some(Self::Ml),
            "l" | "liter" | "liters" | "litre" | "litres" => Some(Self::L),
            "oz" => Some(Self::Oz),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weight {
    pub value: f64,
    pub unit: WeightUnit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capacity {
    pub value: f64,
    pub unit: CapacityUnit,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dimensions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter: Option<f64>,
}

// ── Products ──

/// Field values gathered for one product before its name is known to be present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub material: Option<String>,
    pub weight: Option<Weight>,
    pub capacity: Option<Capacity>,
    pub color: Option<String>,
    pub sku: Option<String>,
    pub recycled_content: Option<f64>,
    pub dimensions: Option<Dimensions>,
}

impl ProductDraft {
    /// A draft without a non-blank name never becomes a record.
    pub fn into_record(self) -> Option<ProductRecord> {
        let product_name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())?;

        Some(ProductRecord {
            product_name,
            description: self.description,
            material_type: self.material,
            weight: self.weight.map(|w| w.value),
            weight_unit: self.weight.map(|w| w.unit),
            capacity: self.capacity.map(|c| c.value),
            capacity_unit: self.capacity.map(|c| c.unit),
            color: self.color,
            dimensions: self.dimensions,
            recycled_content: self.recycled_content,
            sku: self.sku,
            product_image: None,
            additional_images: Vec::new(),
            source_url: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub product_name: String,
    pub description: Option<String>,
    pub material_type: Option<String>,
    pub weight: Option<f64>,
    pub weight_unit: Option<WeightUnit>,
    pub capacity: Option<f64>,
    pub capacity_unit: Option<CapacityUnit>,
    pub color: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub recycled_content: Option<f64>,
    pub sku: Option<String>,
    pub product_image: Option<String>,
    pub additional_images: Vec<String>,
    pub source_url: Option<String>,
}

// ── Company ──

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactDetails {
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub company_name: String,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub supplier_type: &'static str,
    pub description: Option<String>,
}

impl CompanyProfile {
    pub fn named(company_name: impl Into<String>) -> Self {
        CompanyProfile {
            company_name: company_name.into(),
            address: None,
            email: None,
            phone: None,
            website: None,
            supplier_type: SUPPLIER_TYPE,
            description: None,
        }
    }

    /// Contact fields are set once; later sources only fill gaps.
    pub fn fill_contacts(&mut self, contacts: ContactDetails) {
        fill(&mut self.address, contacts.address);
        fill(&mut self.email, contacts.email);
        fill(&mut self.phone, contacts.phone);
        fill(&mut self.website, contacts.website);
    }

    /// Replaces the description only with a strictly longer candidate.
    pub fn offer_description(&mut self, candidate: Option<String>) -> bool {
        let Some(candidate) = candidate.filter(|c| !c.trim().is_empty()) else {
            return false;
        };
        let current_len = self
            .description
            .as_ref()
            .map(|d| d.chars().count())
            .unwrap_or(0);
        if self.description.is_none() || candidate.chars().count() > current_len {
            self.description = Some(candidate);
            return true;
        }
        false
    }
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value.filter(|v| !v.trim().is_empty());
    }
}

// ── Output envelope ──

#[derive(Debug, Clone, PartialEq)]
pub enum ResultEnvelope {
    Success {
        supplier: CompanyProfile,
        products: Vec<ProductRecord>,
    },
    Failure {
        error: String,
    },
}

impl ResultEnvelope {
    pub fn success(supplier: CompanyProfile, products: Vec<ProductRecord>) -> Self {
        ResultEnvelope::Success { supplier, products }
    }

    pub fn failure(error: impl Display) -> Self {
        ResultEnvelope::Failure {
            error: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultEnvelope::Success { .. })
    }
}

impl Serialize for ResultEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResultEnvelope::Success { supplier, products } => {
                let mut s = serializer.serialize_struct("ResultEnvelope", 4)?;
                s.serialize_field("success", &true)?;
                s.serialize_field("supplierData", supplier)?;
                s.serialize_field("productsData", products)?;
                s.serialize_field("totalProducts", &products.len())?;
                s.end()
            }
            ResultEnvelope::Failure { error } => {
                let mut s = serializer.serialize_struct("ResultEnvelope", 2)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("error", error)?;
                s.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_without_name_is_dropped() {
        let draft = ProductDraft {
            name: Some("   ".into()),
            material: Some("Glass".into()),
            ..Default::default()
        };
        assert!(draft.into_record().is_none());
    }

    #[test]
    fn email_is_set_once() {
        let mut profile = CompanyProfile::named("Acme");
        profile.fill_contacts(ContactDetails {
            email: Some("info@acme.com".into()),
            ..Default::default()
        });
        profile.fill_contacts(ContactDetails {
            email: Some("sales@acme.com".into()),
            phone: Some("555-123-4567".into()),
            ..Default::default()
        });
        assert_eq!(profile.email.as_deref(), Some("info@acme.com"));
        assert_eq!(profile.phone.as_deref(), Some("555-123-4567"));
    }

    #[test]
    fn description_only_grows() {
        let mut profile = CompanyProfile::named("Acme");
        assert!(profile.offer_description(Some("Glass jars since 1950.".into())));
        assert!(!profile.offer_description(Some("Short.".into())));
        assert!(!profile.offer_description(Some("Glass jars since 1951.".into())));
        assert!(profile.offer_description(Some("Glass jars and bottles since 1950.".into())));
        assert_eq!(
            profile.description.as_deref(),
            Some("Glass jars and bottles since 1950.")
        );
    }

    #[test]
    fn success_envelope_shape() {
        let record = ProductDraft {
            name: Some("Glass Jar 250ml".into()),
            weight: Some(Weight {
                value: 180.0,
                unit: WeightUnit::G,
            }),
            ..Default::default()
        }
        .into_record()
        .unwrap();
        let env = ResultEnvelope::success(CompanyProfile::named("Acme"), vec![record]);
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["totalProducts"], 1);
        assert_eq!(json["supplierData"]["supplierType"], "Packaging");
        assert_eq!(json["productsData"][0]["weightUnit"], "g");
        assert!(json["productsData"][0]["capacity"].is_null());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failure_envelope_has_no_data() {
        let json = serde_json::to_value(ResultEnvelope::failure("boom")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
        assert!(json.get("supplierData").is_none());
        assert!(json.get("productsData").is_none());
    }
}
