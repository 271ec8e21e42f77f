mod login;
pub use login::Login;

mod register;
pub use register::Register;

mod shell;
pub use shell::Shell;

mod protected;
pub use protected::Protected;

mod dashboard;
pub use dashboard::Dashboard;

mod admin;
pub use admin::Admin;

mod profile;
pub use profile::Profile;
