use axent_common::marketplace::Equipment;
use axent_common::Role;
use serde::Deserialize;

/// Catalog filters from the query string. Absent fields match everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
}

pub fn filter_by_category<'a>(items: impl IntoIterator<Item = &'a Equipment>, category: Option<&str>) -> Vec<&'a Equipment> {
    items
        .into_iter()
        .filter(|e| category.map_or(true, |c| e.category == c))
        .collect()
}

pub fn visible_to<'a>(items: impl IntoIterator<Item = &'a Equipment>, role: Role) -> Vec<&'a Equipment> {
    items
        .into_iter()
        .filter(|e| e.visible_to_roles.contains(&role))
        .collect()
}

/// Case-insensitive match on name, description or category.
pub fn search<'a>(items: impl IntoIterator<Item = &'a Equipment>, query: &str) -> Vec<&'a Equipment> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return items.into_iter().collect();
    }
    items
        .into_iter()
        .filter(|e| {
            e.name.to_lowercase().contains(&query)
                || e.description.to_lowercase().contains(&query)
                || e.category.to_lowercase().contains(&query)
        })
        .collect()
}

pub fn find_by_id<'a>(items: &'a [Equipment], id: &str) -> Option<&'a Equipment> {
    items.iter().find(|e| e.id == id)
}

impl CatalogQuery {
    /// Listings `role` may see, narrowed by category and search text.
    pub fn apply<'a>(&self, items: &'a [Equipment], role: Role) -> Vec<&'a Equipment> {
        let visible = visible_to(items, role);
        let in_category = filter_by_category(visible, self.category.as_deref().filter(|c| !c.is_empty()));
        search(in_category, self.q.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axent_common::marketplace::{EquipmentClass, PriceUnit, ProviderSummary, VerificationStatus};
    use axent_common::{Coordinates, Location};
    use std::collections::HashMap;

    pub(crate) fn equipment(id: &str, name: &str, category: &str, roles: &[Role]) -> Equipment {
        Equipment {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            equipment_type: "machine".to_string(),
            price: 1500.0,
            price_unit: PriceUnit::Day,
            description: format!("{} available for hire", name),
            specifications: HashMap::new(),
            images: Vec::new(),
            location: Location {
                city: "Udupi".to_string(),
                coordinates: Coordinates { lat: 13.3409, lng: 74.7421 },
            },
            provider: ProviderSummary {
                id: "prov_1".to_string(),
                name: "Coastal Rentals".to_string(),
                rating: 4.6,
            },
            availability: true,
            equipment_class: EquipmentClass::Agriculture,
            visible_to_roles: roles.to_vec(),
            verification_status: VerificationStatus::Verified,
            last_verified_at: None,
            reliability_score: 0.9,
        }
    }

    fn items() -> Vec<Equipment> {
        vec![
            equipment("e1", "Mahindra 575 Tractor", "Tractors", &[Role::Customer, Role::Organization]),
            equipment("e2", "JCB 3DX Backhoe", "Excavators", &[Role::Organization]),
            equipment("e3", "Rotavator", "Tillage", &[Role::Customer]),
        ]
    }

    #[test]
    fn test_filter_by_category() {
        let items = items();
        assert_eq!(filter_by_category(&items, Some("Excavators")).len(), 1);
        assert_eq!(filter_by_category(&items, None).len(), 3);
        assert!(filter_by_category(&items, Some("excavators")).is_empty());
    }

    #[test]
    fn test_visible_to_role() {
        let items = items();
        let ids: Vec<_> = visible_to(&items, Role::Customer).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e3"]);
        assert!(visible_to(&items, Role::Provider).is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let items = items();
        assert_eq!(search(&items, "tractor")[0].id, "e1");
        assert_eq!(search(&items, "TILLAGE")[0].id, "e3");
        assert_eq!(search(&items, "").len(), 3);
        assert!(search(&items, "crane").is_empty());
    }

    #[test]
    fn test_query_combines_filters() {
        let items = items();
        let query = CatalogQuery {
            category: Some("Tractors".to_string()),
            q: Some("mahindra".to_string()),
        };
        let found = query.apply(&items, Role::Customer);
        assert_eq!(found.len(), 1);
        assert!(query.apply(&items, Role::Provider).is_empty());
    }

    #[test]
    fn test_find_by_id() {
        let items = items();
        assert_eq!(find_by_id(&items, "e2").unwrap().name, "JCB 3DX Backhoe");
        assert!(find_by_id(&items, "e9").is_none());
    }
}
