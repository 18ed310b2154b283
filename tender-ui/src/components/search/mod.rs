pub mod history;
pub mod session;
pub mod view;

pub use view::SearchView;
