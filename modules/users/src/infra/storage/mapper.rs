use anyhow::Context;
use sea_orm::Set;

use crate::contract::model::{ObjectId, User};
use crate::infra::storage::entity::{ActiveModel, Model as UserEntity};

/// Convert a database entity to a contract model
pub fn entity_to_contract(entity: UserEntity) -> anyhow::Result<User> {
    let id = ObjectId::parse_str(&entity.id)
        .with_context(|| format!("corrupt id in users table: '{}'", entity.id))?;
    Ok(User {
        id,
        name: entity.name,
        age: entity.age,
    })
}

/// Full active model for insert/update
pub fn contract_to_active(user: User) -> ActiveModel {
    ActiveModel {
        id: Set(user.id.to_string()),
        name: Set(user.name),
        age: Set(user.age),
    }
}
