use crate::contract::model::{ProjectedUser, User};
use crate::domain::error::DomainError;

/// Which attributes of a user a read returns.
///
/// Parsed from a space-separated list: `"name age"` keeps `_id` plus the named
/// attributes, `"-age"` drops the named attributes. Unknown names are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub id: bool,
    pub name: bool,
    pub age: bool,
}

impl Default for Projection {
    fn default() -> Self {
        Self::full()
    }
}

impl Projection {
    pub fn full() -> Self {
        Self {
            id: true,
            name: true,
            age: true,
        }
    }

    pub fn is_full(&self) -> bool {
        self.id && self.name && self.age
    }

    pub fn parse(fields: &str) -> Result<Self, DomainError> {
        let mut included: Vec<&str> = Vec::new();
        let mut excluded: Vec<&str> = Vec::new();

        for token in fields.split_whitespace() {
            match token.strip_prefix('-') {
                Some(field) => excluded.push(field),
                None => included.push(token),
            }
        }

        let id_excluded = excluded.contains(&"_id");
        // A lone `_id` is an inclusion list too; next to `-field` it only keeps the id.
        let has_inclusion =
            included.iter().any(|f| *f != "_id") || (!included.is_empty() && excluded.is_empty());

        if has_inclusion {
            if let Some(field) = excluded.iter().find(|f| **f != "_id") {
                return Err(DomainError::validation(format!(
                    "Cannot exclude \"{field}\" in an inclusion projection"
                )));
            }
            return Ok(Self {
                id: !id_excluded,
                name: included.contains(&"name"),
                age: included.contains(&"age"),
            });
        }

        Ok(Self {
            id: !id_excluded,
            name: !excluded.contains(&"name"),
            age: !excluded.contains(&"age"),
        })
    }

    pub fn apply(&self, user: User) -> ProjectedUser {
        ProjectedUser {
            id: self.id.then_some(user.id),
            name: self.name.then_some(user.name),
            age: self.age.then_some(user.age),
        }
    }
}
