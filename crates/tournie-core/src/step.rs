//! Step trait and related types.

use crate::context::Context;
use crate::error::HandlerError;
use crate::response::Response;
use async_trait::async_trait;
use std::fmt::{self, Debug};

/// Type-safe step name wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepName(String);

impl StepName {
    /// Creates a new StepName.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a StepName from a type's name (extracts last segment).
    pub fn from_type_name<T: ?Sized>() -> Self {
        let full_name = std::any::type_name::<T>();
        let without_generics = full_name.split('<').next().unwrap_or(full_name);
        let short_name = without_generics
            .rsplit("::")
            .next()
            .unwrap_or("UnknownStep");
        Self::new(short_name)
    }

    /// Returns the step name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StepName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StepName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for StepName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// What a step produced.
///
/// Unexpected failures are not an `Outcome`: they travel as the `Err` side
/// of [`StepResult`].
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Continue with the (possibly extended) context.
    Proceed(Context),
    /// The pipeline is done; this is the response.
    Complete(Response),
    /// Stop and show this response to the user.
    Fail(Response),
}

impl Outcome {
    /// Creates a `Complete` outcome.
    pub fn done(response: impl Into<Response>) -> Self {
        Self::Complete(response.into())
    }

    /// Creates a `Fail` outcome.
    pub fn fail(response: impl Into<Response>) -> Self {
        Self::Fail(response.into())
    }

    /// Returns `true` for `Proceed`.
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed(_))
    }

    /// Returns the context of a `Proceed` outcome.
    pub fn into_context(self) -> Option<Context> {
        match self {
            Self::Proceed(ctx) => Some(ctx),
            Self::Complete(_) | Self::Fail(_) => None,
        }
    }

    /// Converts the outcome into the response handed to the transport.
    ///
    /// A pipeline that ends on `Proceed` produced no response; `None` is
    /// returned and the caller decides what to show.
    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Proceed(_) => None,
            Self::Complete(response) | Self::Fail(response) => Some(response),
        }
    }
}

/// Result of running a step.
pub type StepResult = Result<Outcome, HandlerError>;

/// An atomic, dependency-parameterised unit of a pipeline.
///
/// Dependencies are passed explicitly on every run instead of being
/// captured, so the same step value can serve any number of requests.
///
/// # Examples
///
/// ```
/// use tournie_core::{Context, Message, Outcome, Response, Step, StepResult};
/// use async_trait::async_trait;
///
/// struct Greeting(&'static str);
///
/// #[derive(Debug)]
/// struct Greet;
///
/// #[async_trait]
/// impl Step<Greeting> for Greet {
///     async fn run(&self, deps: &Greeting, ctx: Context) -> StepResult {
///         Ok(Outcome::done(format!("{}, {}!", deps.0, ctx.message().sender)))
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() {
/// let outcome = Greet
///     .run(&Greeting("Hello"), Context::new(Message::text("alice", "")))
///     .await
///     .expect("greeting never fails");
/// assert_eq!(outcome.into_response(), Some(Response::from("Hello, alice!")));
/// # }
/// ```
#[async_trait]
pub trait Step<D>: Send + Sync + Debug {
    /// Runs the step.
    ///
    /// # Returns
    ///
    /// - `Ok(Outcome::Proceed(ctx))` - Continue with `ctx`
    /// - `Ok(Outcome::Complete(response))` - Pipeline finished
    /// - `Ok(Outcome::Fail(response))` - Expected failure, shown as is
    /// - `Err(error)` - Raised failure, classified by the error boundary
    async fn run(&self, deps: &D, ctx: Context) -> StepResult;

    /// Returns the step name.
    ///
    /// By default, uses the type name.
    fn name(&self) -> StepName {
        StepName::from_type_name::<Self>()
    }
}

/// A boxed step, as stored by combinators and the router.
pub type BoxStep<D> = Box<dyn Step<D>>;

#[async_trait]
impl<D: Send + Sync> Step<D> for Box<dyn Step<D>> {
    async fn run(&self, deps: &D, ctx: Context) -> StepResult {
        self.as_ref().run(deps, ctx).await
    }

    fn name(&self) -> StepName {
        self.as_ref().name()
    }
}

/// A synchronous step built from a closure.
///
/// Handy for pure rendering steps at the end of a pipeline.
///
/// ```
/// use tournie_core::{FnStep, Outcome};
///
/// let step = FnStep::new("Echo", |_deps: &(), ctx| {
///     Ok(Outcome::done(ctx.message().text.clone()))
/// });
/// assert_eq!(tournie_core::Step::<()>::name(&step).as_str(), "Echo");
/// ```
pub struct FnStep<F> {
    name: StepName,
    f: F,
}

impl<F> FnStep<F> {
    /// Wraps `f` as a step called `name`.
    pub fn new<D>(name: impl Into<StepName>, f: F) -> Self
    where
        F: Fn(&D, Context) -> StepResult,
    {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Debug for FnStep<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStep").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<D, F> Step<D> for FnStep<F>
where
    D: Send + Sync,
    F: Fn(&D, Context) -> StepResult + Send + Sync,
{
    async fn run(&self, deps: &D, ctx: Context) -> StepResult {
        (self.f)(deps, ctx)
    }

    fn name(&self) -> StepName {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[derive(Debug)]
    struct TestStep;

    #[async_trait]
    impl Step<()> for TestStep {
        async fn run(&self, _deps: &(), ctx: Context) -> StepResult {
            Ok(Outcome::Proceed(ctx.with("test", "executed".to_string())))
        }
    }

    #[tokio::test]
    async fn test_step_execution() {
        let ctx = Context::new(Message::text("U1", ""));
        let outcome = TestStep.run(&(), ctx).await.expect("step succeeds");
        let ctx = outcome.into_context().expect("step proceeds");
        assert_eq!(ctx.get::<String>("test").map(String::as_str), Some("executed"));
    }

    #[test]
    fn test_step_name() {
        assert_eq!(Step::<()>::name(&TestStep), StepName::new("TestStep"));
        let boxed: BoxStep<()> = Box::new(TestStep);
        assert_eq!(boxed.name(), StepName::new("TestStep"));
    }

    #[test]
    fn test_step_name_from_generic_type() {
        assert_eq!(
            StepName::from_type_name::<Vec<String>>(),
            StepName::new("Vec")
        );
    }

    #[tokio::test]
    async fn test_fn_step() {
        let step = FnStep::new("Shout", |_deps: &(), ctx: Context| {
            Ok(Outcome::done(ctx.message().text.to_uppercase()))
        });
        let outcome = step
            .run(&(), Context::new(Message::text("U1", "hi")))
            .await
            .expect("step succeeds");
        assert_eq!(
            outcome.into_response(),
            Some(Response::from("HI"))
        );
        assert_eq!(Step::<()>::name(&step).as_str(), "Shout");
    }

    #[test]
    fn test_outcome_helpers() {
        assert!(Outcome::Proceed(Context::new(Message::default())).is_proceed());
        assert!(Outcome::fail("no").into_context().is_none());
        assert_eq!(
            Outcome::fail("no").into_response(),
            Some(Response::from("no"))
        );
    }
}
