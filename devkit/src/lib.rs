/*!
# statusrep DevKit - Stubs et utilitaires pour tests

Bibliothèque facilitant les tests de statusrep avec:
- Stub HTTP du endpoint `/<host>/status` (pas besoin de vrais hôtes)
- Builders de corps de status JSON
- Lecture et vérification du rapport produit
*/

pub mod status_stub;
pub mod test_utils;

pub use axum::http::StatusCode;
pub use status_stub::{StatusStub, StubHost};
pub use test_utils::{init_test_logging, parse_report, status_body, ReportLine};
