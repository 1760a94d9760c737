pub use dispatch::{EventDispatcher, PointerEvent, PointerListener};
pub use item::{DraggableItem, ItemEvent, ItemId, ItemListener, ItemPointer};
pub use state::{DdList, DdListError, ListLayout};
pub use style::{BorderStyle, ItemStyle};

mod dispatch;
mod item;
mod state;
pub mod style;
pub mod utils;

pub mod app;
pub mod config;
pub mod logging;
pub mod mod_settings;
pub mod profiles;
