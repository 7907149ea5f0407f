//! Service layer: decoration caches, picker model and host notifications.

pub mod current_user_decorations;
pub mod decoration_picker;
pub mod event_bus;
pub mod live_user_notifier;
pub mod users_decorations;

pub use current_user_decorations::CurrentUserDecorationsStore;
pub use decoration_picker::{DecorationPicker, PickerItem, PickerSection};
pub use event_bus::{DecorEvent, EventBus, EventBusConfig, EventPayload};
pub use live_user_notifier::LiveUserNotifier;
pub use users_decorations::{BatchOutcome, BatchReport, UsersDecorationsStore};
