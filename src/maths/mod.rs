pub mod derivative;
pub mod ellipse;
pub mod norm;

pub use derivative::{central_derivative, derive};
pub use ellipse::{chi2_quantile_2dof, fit_confidence_ellipse, ConfidenceEllipse};
pub use norm::{displacement, norm, peak_norm, row_norms, traveled_distance};
