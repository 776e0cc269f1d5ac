use serde_json::{Value, json};

use super::ReaderId;
use super::document::{self, DocumentRecord};

/// 利用者
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reader {
    pub id: ReaderId,
    pub name: String,
    pub email: String,
}

impl Reader {
    pub fn new(id: ReaderId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

impl DocumentRecord for Reader {
    fn to_document(&self) -> Value {
        json!({
            "Id": self.id.value(),
            "Name": self.name,
            "Email": self.email,
        })
    }

    fn from_document(doc: &Value) -> Self {
        let fields = document::fields(doc);
        Self {
            id: ReaderId::new(document::integer(fields, "Id")),
            name: document::text(fields, "Name"),
            email: document::text(fields, "Email"),
        }
    }
}
