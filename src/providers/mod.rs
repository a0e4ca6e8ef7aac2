mod azure;

pub use azure::AzureDevOpsProvider;
