#[path = "e2e/shop_scenario.rs"]
mod shop_scenario;

#[path = "e2e/unknown_request.rs"]
mod unknown_request;

#[path = "e2e/mix_isolation.rs"]
mod mix_isolation;

#[path = "e2e/custom_registries.rs"]
mod custom_registries;

#[path = "e2e/model_documents.rs"]
mod model_documents;
