//! Dispatcher - resolves one argument vector to exactly one handler.
//!
//! A dispatch runs to completion through the phases Tokenizing → Walking →
//! GuardEvaluating → Binding → Invoking; any phase can fail, and the
//! failure is returned to the caller as a value. The tree is read-only
//! here, so repeated dispatches against one tree are independent and
//! reentrant.

use tracing::debug;

use crate::error::{DispatchError, LookupFailure};
use crate::switch::expr::SwitchExpression;
use crate::switch::registry::{SwitchBindings, SwitchRegionToken, SwitchScope, bind_switches};
use crate::tree::{PathTree, Registration, RouteParams};

/// Dispatch phases, in run order. `Failed` is reachable from any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    Idle,
    Tokenizing,
    Walking,
    GuardEvaluating,
    Binding,
    Invoking,
    Done,
    Failed,
}

/// How argv tokens are classified.
///
/// Runtime path tokens are split on `/` with empty pieces dropped, so
/// `a//b` and `a/b/` resolve like `a b`. That leniency is deliberate and
/// runtime-only: in route *definitions* the same shapes are
/// [`DefinitionError::EmptySegment`](crate::error::DefinitionError),
/// because there they hide a typo'd declaration rather than shell
/// artifacts.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Prefix marking a switch token. Leading repetitions are stripped, so
    /// with the default `-` both `-v` and `--verbose` lex to their names.
    pub flag_prefix: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            flag_prefix: "-".to_string(),
        }
    }
}

/// What a selected handler receives: bound route parameters and switches.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Invocation {
    pub path: Vec<String>,
    pub params: RouteParams,
    pub switches: SwitchBindings,
}

/// A fully resolved dispatch, ready to invoke.
#[derive(Debug)]
pub struct Resolution<'t, H> {
    pub handler: &'t H,
    pub invocation: Invocation,
}

impl<'t, H> Resolution<'t, H> {
    /// Call the handler. Its errors come back untouched; the dispatcher
    /// never intercepts or wraps them.
    pub fn invoke<T, E>(&self) -> Result<T, E>
    where
        H: Fn(&Invocation) -> Result<T, E>,
    {
        (self.handler)(&self.invocation)
    }
}

/// Failure of one complete dispatch-and-invoke.
#[derive(Debug, thiserror::Error)]
pub enum DispatchFailure<E> {
    /// Resolution failed before any handler ran.
    #[error(transparent)]
    Dispatch(DispatchError),

    /// The selected handler itself failed; carried unmodified.
    #[error("{0}")]
    Handler(E),
}

/// Resolves argument vectors against one read-only tree.
#[derive(Debug)]
pub struct Dispatcher<'t, H> {
    tree: &'t PathTree<H>,
    config: DispatchConfig,
}

impl<'t, H> Dispatcher<'t, H> {
    pub fn new(tree: &'t PathTree<H>) -> Self {
        Self::with_config(tree, DispatchConfig::default())
    }

    pub fn with_config(tree: &'t PathTree<H>, config: DispatchConfig) -> Self {
        Self { tree, config }
    }

    /// Run every phase up to (not including) handler invocation.
    pub fn resolve(&self, argv: &[String]) -> Result<Resolution<'t, H>, DispatchError> {
        match self.try_resolve(argv) {
            Ok(resolution) => {
                debug!(phase = ?DispatchPhase::Invoking, "dispatch resolved");
                Ok(resolution)
            }
            Err(err) => {
                debug!(phase = ?DispatchPhase::Failed, error = %err, "dispatch failed");
                Err(err)
            }
        }
    }

    fn try_resolve(&self, argv: &[String]) -> Result<Resolution<'t, H>, DispatchError> {
        debug!(phase = ?DispatchPhase::Tokenizing, argc = argv.len());
        let tokens = self.tokenize(argv)?;

        debug!(phase = ?DispatchPhase::Walking, path = ?tokens.path);
        let hit = self.tree.lookup(&tokens.path)?;

        let scope = self.tree.scope_of(hit.node);

        debug!(phase = ?DispatchPhase::GuardEvaluating, registrations = self.tree.registrations(hit.node).len());
        let registration = self.select_registration(hit.node, &tokens.switch_tokens, &scope)?;

        debug!(phase = ?DispatchPhase::Binding);
        let switches = bind_switches(&scope, &tokens.region)?;

        Ok(Resolution {
            handler: &registration.handler,
            invocation: Invocation {
                path: tokens.path,
                params: hit.params,
                switches,
            },
        })
    }

    /// Resolve and invoke in one step, for `Fn`-style handlers.
    pub fn dispatch<T, E>(&self, argv: &[String]) -> Result<T, DispatchFailure<E>>
    where
        H: Fn(&Invocation) -> Result<T, E>,
    {
        let resolution = self.resolve(argv).map_err(DispatchFailure::Dispatch)?;
        let outcome = resolution.invoke().map_err(DispatchFailure::Handler);
        debug!(phase = ?DispatchPhase::Done, ok = outcome.is_ok());
        outcome
    }

    /// First registration, in registration order, whose guard holds. Guard
    /// variables and token names resolve through the node's visible scope.
    fn select_registration(
        &self,
        node: crate::tree::NodeId,
        switch_tokens: &[SwitchExpression],
        scope: &SwitchScope<'_>,
    ) -> Result<&'t Registration<H>, DispatchError> {
        self.tree
            .registrations(node)
            .iter()
            .find(|r| r.guard.matches(switch_tokens, scope))
            .ok_or_else(|| {
                LookupFailure::NoHandlerMatched {
                    path: self.tree.path_of(node),
                }
                .into()
            })
    }

    /// Partition argv: positional tokens before the first flag token form
    /// the path (each additionally split on `/`, empty pieces dropped);
    /// everything from the first flag token on is the switch region.
    fn tokenize(&self, argv: &[String]) -> Result<ArgvTokens, DispatchError> {
        let mut tokens = ArgvTokens::default();
        let mut in_switch_region = false;

        for arg in argv {
            if arg.starts_with(&self.config.flag_prefix) {
                in_switch_region = true;
                let name = strip_repeated_prefix(arg, &self.config.flag_prefix);
                let expr = SwitchExpression::parse(name)?;
                tokens.switch_tokens.push(expr.clone());
                tokens.region.push(SwitchRegionToken::Switch(expr));
            } else if in_switch_region {
                tokens.region.push(SwitchRegionToken::Value(arg.clone()));
            } else {
                tokens
                    .path
                    .extend(arg.split('/').filter(|p| !p.is_empty()).map(str::to_string));
            }
        }
        Ok(tokens)
    }
}

#[derive(Debug, Default)]
struct ArgvTokens {
    path: Vec<String>,
    region: Vec<SwitchRegionToken>,
    switch_tokens: Vec<SwitchExpression>,
}

fn strip_repeated_prefix<'a>(arg: &'a str, prefix: &str) -> &'a str {
    let mut rest = arg;
    while let Some(stripped) = rest.strip_prefix(prefix) {
        rest = stripped;
    }
    rest
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TreeBuilder;
    use crate::error::BindingError;
    use crate::switch::registry::{SwitchDefinition, SwitchValue};
    use crate::tree::ParamValue;

    type Handler = fn(&Invocation) -> Result<String, String>;

    fn echo(inv: &Invocation) -> Result<String, String> {
        Ok(format!("{:?}", inv.params))
    }

    fn failing(_inv: &Invocation) -> Result<String, String> {
        Err("kaput".to_string())
    }

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dispatches_a_literal_route() {
        let mut builder: TreeBuilder<Handler> = TreeBuilder::new();
        builder.route("fetch/target", echo).unwrap();
        let tree = builder.build();

        let dispatcher = Dispatcher::new(&tree);
        let out = dispatcher.dispatch::<String, String>(&argv(&["fetch", "target"]));
        assert!(out.is_ok());
    }

    #[test]
    fn slash_joined_and_split_argv_are_equivalent() {
        let mut builder: TreeBuilder<Handler> = TreeBuilder::new();
        builder.route("fetch/target", echo).unwrap();
        let tree = builder.build();
        let dispatcher = Dispatcher::new(&tree);

        let joined = dispatcher.resolve(&argv(&["fetch/target"])).unwrap();
        let split = dispatcher.resolve(&argv(&["fetch", "target"])).unwrap();
        assert_eq!(joined.invocation.path, split.invocation.path);
    }

    #[test]
    fn doubled_separators_are_runtime_noise() {
        let mut builder: TreeBuilder<Handler> = TreeBuilder::new();
        builder.route("fetch/target", echo).unwrap();
        let tree = builder.build();
        let dispatcher = Dispatcher::new(&tree);

        // Lenient at dispatch, unlike in route definitions.
        for raw in ["fetch//target", "fetch/target/", "/fetch/target"] {
            let hit = dispatcher.resolve(&argv(&[raw])).unwrap();
            assert_eq!(hit.invocation.path, vec!["fetch", "target"], "argv: {raw}");
        }
    }

    #[test]
    fn params_are_bound_into_the_invocation() {
        let mut builder: TreeBuilder<Handler> = TreeBuilder::new();
        builder.route("pkg/install/:name", echo).unwrap();
        let tree = builder.build();

        let resolution = Dispatcher::new(&tree)
            .resolve(&argv(&["pkg", "install", "serde"]))
            .unwrap();
        assert_eq!(
            resolution.invocation.params.get("name"),
            Some(&ParamValue::One("serde".to_string()))
        );
    }

    #[test]
    fn switches_are_bound_from_the_flag_region() {
        let mut builder: TreeBuilder<Handler> = TreeBuilder::new();
        let node = builder.route("pkg/install/:name", echo).unwrap();
        builder
            .switch(node, SwitchDefinition::named(Some("v"), Some("verbose")))
            .unwrap();
        builder
            .switch(node, SwitchDefinition::named(None, Some("level")).value_name("n"))
            .unwrap();
        let tree = builder.build();

        let resolution = Dispatcher::new(&tree)
            .resolve(&argv(&["pkg", "install", "serde", "--level", "3", "-v"]))
            .unwrap();
        let switches = &resolution.invocation.switches;
        assert_eq!(switches.get("verbose"), Some(&SwitchValue::Bool(true)));
        assert_eq!(switches.get("level"), Some(&SwitchValue::One("3".to_string())));
    }

    #[test]
    fn unknown_switch_is_a_binding_error() {
        let mut builder: TreeBuilder<Handler> = TreeBuilder::new();
        builder.route("fetch/target", echo).unwrap();
        let tree = builder.build();

        let err = Dispatcher::new(&tree)
            .resolve(&argv(&["fetch", "target", "--nope"]))
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Binding(BindingError::UnknownSwitch { .. })
        ));
    }

    #[test]
    fn unmatched_path_is_not_found() {
        let mut builder: TreeBuilder<Handler> = TreeBuilder::new();
        builder.route("fetch/target", echo).unwrap();
        let tree = builder.build();

        let err = Dispatcher::new(&tree)
            .resolve(&argv(&["fetch", "nothing"]))
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Lookup(LookupFailure::NotFound { .. })
        ));
    }

    #[test]
    fn all_guards_false_is_no_handler_matched() {
        let mut builder: TreeBuilder<Handler> = TreeBuilder::new();
        let node = builder
            .route("fetch/target[a > \"5\"]", echo)
            .unwrap();
        builder
            .switch(node, SwitchDefinition::named(None, Some("a")).value_name("n"))
            .unwrap();
        let tree = builder.build();

        let err = Dispatcher::new(&tree)
            .resolve(&argv(&["fetch", "target", "--a=1"]))
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Lookup(LookupFailure::NoHandlerMatched { .. })
        ));
    }

    #[test]
    fn guards_see_tokens_before_binding() {
        let mut builder: TreeBuilder<Handler> = TreeBuilder::new();
        let node = builder
            .route("fetch/target[a > \"1\"]", echo)
            .unwrap();
        builder
            .switch(node, SwitchDefinition::named(None, Some("a")).value_name("n"))
            .unwrap();
        let tree = builder.build();

        // Value supplied as a trailing token, not inline: the guard still
        // sees only the raw token, which has no value, so it is false.
        let err = Dispatcher::new(&tree)
            .resolve(&argv(&["fetch", "target", "--a", "2"]))
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Lookup(LookupFailure::NoHandlerMatched { .. })
        ));

        // Inline form is visible to the guard.
        assert!(Dispatcher::new(&tree)
            .resolve(&argv(&["fetch", "target", "--a=2"]))
            .is_ok());
    }

    #[test]
    fn short_spelling_satisfies_a_long_named_guard() {
        fn guarded(_: &Invocation) -> Result<String, String> {
            Ok("guarded".to_string())
        }
        fn plain(_: &Invocation) -> Result<String, String> {
            Ok("plain".to_string())
        }

        let mut builder: TreeBuilder<Handler> = TreeBuilder::new();
        let node = builder.route("pkg/install[force = \"true\"]", guarded).unwrap();
        builder.route("pkg/install", plain).unwrap();
        builder
            .switch(node, SwitchDefinition::named(Some("f"), Some("force")))
            .unwrap();
        let tree = builder.build();
        let dispatcher = Dispatcher::new(&tree);

        // Both spellings of the declared switch select the guarded handler.
        for flag in ["--force", "-f"] {
            let out = dispatcher
                .dispatch::<String, String>(&argv(&["pkg", "install", flag]))
                .unwrap();
            assert_eq!(out, "guarded", "flag: {flag}");
        }
        let out = dispatcher
            .dispatch::<String, String>(&argv(&["pkg", "install"]))
            .unwrap();
        assert_eq!(out, "plain");
    }

    #[test]
    fn handler_errors_propagate_unmodified() {
        let mut builder: TreeBuilder<Handler> = TreeBuilder::new();
        builder.route("boom", failing).unwrap();
        let tree = builder.build();

        let err = Dispatcher::new(&tree)
            .dispatch::<String, String>(&argv(&["boom"]))
            .unwrap_err();
        match err {
            DispatchFailure::Handler(message) => assert_eq!(message, "kaput"),
            other => panic!("expected Handler failure, got {other:?}"),
        }
    }

    #[test]
    fn custom_flag_prefix_is_honored() {
        let mut builder: TreeBuilder<Handler> = TreeBuilder::new();
        let node = builder.route("fetch/target", echo).unwrap();
        builder
            .switch(node, SwitchDefinition::named(None, Some("verbose")))
            .unwrap();
        let tree = builder.build();

        let dispatcher = Dispatcher::with_config(
            &tree,
            DispatchConfig {
                flag_prefix: "+".to_string(),
            },
        );
        let resolution = dispatcher
            .resolve(&argv(&["fetch", "target", "+verbose"]))
            .unwrap();
        assert_eq!(
            resolution.invocation.switches.get("verbose"),
            Some(&SwitchValue::Bool(true))
        );
    }

    #[test]
    fn malformed_runtime_token_fails_tokenizing() {
        let mut builder: TreeBuilder<Handler> = TreeBuilder::new();
        builder.route("fetch/target", echo).unwrap();
        let tree = builder.build();

        let err = Dispatcher::new(&tree)
            .resolve(&argv(&["fetch", "target", "--bad name=1"]))
            .unwrap_err();
        assert!(matches!(err, DispatchError::Token(_)));
    }
}
