// figdesk services
// Stateless policy and engines: URL classification, navigation/popup policy,
// permission policy, external hand-off, settings.

pub mod external_opener;
pub mod navigation_policy;
pub mod permission_policy;
pub mod settings_engine;
pub mod url_classifier;
