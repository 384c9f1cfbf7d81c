pub mod confirm;
pub mod form;
pub mod list;
pub mod record_view;
pub mod text_input;

pub use confirm::{Choice, Confirmation};
pub use form::{Field, Form, FormOutcome, Validator};
pub use list::{Item, SelectableList};
pub use record_view::RecordView;
pub use text_input::TextInput;
