use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
}

/// 建立新項目時送出的內容，id 由服務端產生
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub quantity: i64,
}

impl NewItem {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_json_field_names() {
        let item: Item =
            serde_json::from_str(r#"{"id": 4, "name": "Lamb", "quantity": 20}"#).unwrap();
        assert_eq!(
            item,
            Item {
                id: 4,
                name: "Lamb".to_string(),
                quantity: 20
            }
        );

        let body = serde_json::to_value(NewItem::new("Cheese", 5)).unwrap();
        assert_eq!(body, serde_json::json!({"name": "Cheese", "quantity": 5}));
    }

    #[test]
    fn test_item_rejects_missing_fields() {
        assert!(serde_json::from_str::<Item>(r#"{"name": "Milk"}"#).is_err());
    }
}
