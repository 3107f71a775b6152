pub use callback::Callback;
pub use channel::Deferred;
pub use function::adapt;
pub use function::Args;
pub use function::Callable;
pub use function::Function;
pub use library::promisify;
pub use library::Entry;
pub use library::Method;
pub use library::Promisified;
pub use object::method;
pub use object::Object;
pub use object::Property;
pub use partial::partial;
pub use partial::partial_method;

pub mod partial;

mod callback;
mod channel;
mod function;
mod library;
mod object;
