use std::fmt::Debug;

use k8s_openapi::{serde::de::DeserializeOwned, NamespaceResourceScope};
use kube::{Api, Client, Resource};

pub mod informer;

pub trait GetApi {
    fn global_api<T>(&self) -> Api<T>
    where
        T: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug;

    fn namespaced_api<T>(&self, namespace: &str) -> Api<T>
    where
        T: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Debug;

    /// Api scoped to a single namespace if one is given, spanning all namespaces otherwise.
    fn scoped_api<T>(&self, namespace: Option<&str>) -> Api<T>
    where
        T: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Debug,
    {
        match namespace {
            Some(namespace) => self.namespaced_api(namespace),
            None => self.global_api(),
        }
    }
}

impl GetApi for Client {
    fn global_api<T>(&self) -> Api<T>
    where
        T: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug,
    {
        Api::all(self.clone())
    }

    fn namespaced_api<T>(&self, namespace: &str) -> Api<T>
    where
        T: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Debug,
    {
        Api::namespaced(self.clone(), namespace)
    }
}
