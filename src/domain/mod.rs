mod contact_email;
mod contact_name;
mod role;
mod submission;

pub use contact_email::ContactEmail;
pub use contact_name::ContactName;
pub use role::Role;
pub use submission::{AttributeSet, Submission};
