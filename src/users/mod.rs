// Staff account queries (user management and doctor listing)

pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use models::StaffMember;
pub use repository::StaffRepository;
pub use service::UserService;
