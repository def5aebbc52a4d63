pub mod helpers;
pub mod kubernetes;
pub mod resources;

pub const RESOURCE_GROUP: &str = "cluster-api.k8s.io";
