pub mod model;

pub use model::{ListUsersQuery, NewUser, ObjectId, ObjectIdError, ProjectedUser, User, UserPatch, UsersPage};
