pub mod memory;
pub mod rest;
pub mod stores;

pub use memory::{InMemoryAppointmentStore, InMemoryHolidayCalendar, InMemoryTemplateCatalog};
pub use rest::{
    RestAppointmentStore, RestHolidayCalendar, RestTemplateCatalog, StoreClient,
};
pub use stores::{
    AppointmentStore, CommitOutcome, HolidayCalendar, SlotBucket, TemplateCatalog,
};
