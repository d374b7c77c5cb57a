mod auth;
mod downtime;
mod health_check;
mod users;

pub use auth::login;
pub use auth::refresh;
pub use downtime::create_downtime;
pub use downtime::delete_downtime;
pub use downtime::list_downtime;
pub use health_check::health_check;
pub use users::create_user;
pub use users::delete_user;
pub use users::list_roles;
pub use users::list_users;
pub use users::update_user;
