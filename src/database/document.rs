use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A schema-less record. `serde_json::Map` is ordered by key, which keeps the
/// serialized form of every item canonical.
pub type Item = Map<String, Value>;

/// Field injected into every item on creation and used as its lookup key
pub const ID_FIELD: &str = "id";

/// The whole persisted datastore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    pub resources: Vec<ResourceBucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
}

/// Named collection of items, one per declared resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceBucket {
    pub resource: String,
    pub items: Vec<Item>,
}

/// Stored credential. `password` always holds a PHC-format hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
}

impl Document {
    /// Seed document: one empty bucket per declared name, in declared order
    pub fn seeded<I, S>(names: I, users: Option<Vec<User>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resources: names.into_iter().map(ResourceBucket::empty).collect(),
            users,
        }
    }

    /// First bucket whose `resource` equals `name`
    pub fn bucket(&self, name: &str) -> Option<&ResourceBucket> {
        self.resources.iter().find(|b| b.resource == name)
    }

    pub fn bucket_mut(&mut self, name: &str) -> Option<&mut ResourceBucket> {
        self.resources.iter_mut().find(|b| b.resource == name)
    }

    pub fn find_user(&self, username: &str) -> Option<&User> {
        self.users.as_ref()?.iter().find(|u| u.username == username)
    }
}

impl ResourceBucket {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            resource: name.into(),
            items: Vec::new(),
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item_id(item) == Some(id))
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.position(id).map(|idx| &self.items[idx])
    }

    /// Append `item` under a freshly assigned id, overwriting any client-supplied one
    pub fn insert(&mut self, mut item: Item, id: String) -> &Item {
        item.insert(ID_FIELD.to_string(), Value::String(id));
        self.items.push(item);
        &self.items[self.items.len() - 1]
    }

    /// Replace the item wholesale. The stored id is re-asserted so it stays immutable.
    pub fn replace(&mut self, id: &str, mut item: Item) -> Option<&Item> {
        let idx = self.position(id)?;
        item.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        self.items[idx] = item;
        Some(&self.items[idx])
    }

    /// Shallow right-biased merge of `changes` into the item; nested objects are
    /// replaced, not merged.
    pub fn merge(&mut self, id: &str, changes: Item) -> Option<&Item> {
        let idx = self.position(id)?;
        let target = &mut self.items[idx];
        for (key, value) in changes {
            if key == ID_FIELD {
                continue;
            }
            target.insert(key, value);
        }
        Some(&self.items[idx])
    }

    pub fn remove(&mut self, id: &str) -> Option<Item> {
        let idx = self.position(id)?;
        Some(self.items.remove(idx))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

fn item_id(item: &Item) -> Option<&str> {
    item.get(ID_FIELD).and_then(Value::as_str)
}
