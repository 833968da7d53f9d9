//! Advertising platform integration: the marketing API client and the
//! Campaign Provisioner that drives the ordered object-graph writes.

pub mod client;
pub mod provisioner;
pub mod targeting;

pub use client::{AdPlatform, InsightsSource, MarketingApiClient};
pub use provisioner::{minor_units, CampaignProvisioner, ProvisionRequest};
pub use targeting::Targeting;
