//! Domain services for Best Wishes.
//!
//! Services hold the business rules; storage is reached through the
//! collaborator traits in [`store`].

pub mod access_gate;
pub mod allocator;
pub mod lifecycle;
pub mod memory;
pub mod publication;
pub mod store;

pub use access_gate::{evaluate, evaluate_thread, open_wish, GateDecision, Visit};
pub use allocator::{
    allocate_vip_slot, build_candidate_path, check_availability, parse_vip_slot, resolve_path,
    suggest_alternative, vip_path, Allocation, Availability, VIP_SLOT_COUNT,
};
pub use lifecycle::{can_transition, expire_wish};
pub use memory::{InMemoryBlobStore, InMemoryWishStore};
pub use publication::{
    MediaFile, PublicationLimits, PublicationOrchestrator, PublishOutcome, PublishRequest,
    SlideUpload, UploadFailure, UploadItem,
};
pub use store::{BlobError, BlobStore, WishStore};
