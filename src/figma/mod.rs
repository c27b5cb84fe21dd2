// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Figma REST API access: single GETs, envelope normalization and pagination loops
// role: module/aggregation
// outputs: api (FigmaApi seam + HTTP client), normalize (record extraction), pagination (fetch loops)
// invariants: All network IO in the crate goes through figma::api::FigmaApi
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod api;
pub mod normalize;
pub mod pagination;
