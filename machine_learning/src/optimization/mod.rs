mod adagrad;
mod adam;
mod gradient_descent;
mod lamb;
mod optimizer;
mod radam;
mod rmsprop;

pub use adagrad::AdaGrad;
pub use adam::Adam;
pub use gradient_descent::GradientDescent;
pub use lamb::Lamb;
pub use optimizer::Optimizer;
pub use radam::RAdam;
pub use rmsprop::RmsProp;
