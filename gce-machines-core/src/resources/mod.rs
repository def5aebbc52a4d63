pub mod crd;
pub mod providerconfig;
