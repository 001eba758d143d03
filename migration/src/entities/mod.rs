pub mod click_event;
pub mod conversion;
pub mod partner;
pub mod payout;
pub mod product;
pub mod tracked_link;

pub use click_event::Entity as ClickEventEntity;
pub use conversion::Entity as ConversionEntity;
pub use partner::Entity as PartnerEntity;
pub use payout::Entity as PayoutEntity;
pub use product::Entity as ProductEntity;
pub use tracked_link::Entity as TrackedLinkEntity;
