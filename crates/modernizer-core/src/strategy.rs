use crate::editor::Rule;

/// A migration target: what to look for, what to rewrite literally, and how
/// to ask the rewrite oracle for the rest.
pub trait MigrationStrategy {
    fn name(&self) -> &'static str;

    /// Cheap screen on the file text; files that fail it are left alone.
    fn needs_migration(&self, content: &str) -> bool;

    /// Literal rules, applied in the returned order.
    fn deterministic_rules(&self) -> Vec<Rule>;

    /// Signature that introduces the structural unit handed to the oracle.
    fn anchor(&self) -> &str;

    fn initial_instructions(&self, code: &str) -> String;

    fn fix_instructions(&self, code: &str, diagnostic: &str) -> String;
}

/// Vert.x verticles to Spring WebFlux services.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebFluxStrategy;

const WEBFLUX_ANCHOR: &str = "public void start(Promise<Void> startFuture)";

const WEBFLUX_PROMPT: &str = "\
You are a Senior Java Architect. Refactor the following Legacy Vert.x code to Spring Boot 3 (WebFlux).

RULES:
1. Replace 'start(Promise)' with a '@PostConstruct public void init()' method.
2. Replace Vert.x 'Future' with Project Reactor 'Mono' or 'Flux'.
3. Do NOT use Thread.sleep(). Use Mono.delay() if strictly necessary.
4. Return ONLY the Java method body. No markdown.
";

impl MigrationStrategy for WebFluxStrategy {
    fn name(&self) -> &'static str {
        "webflux"
    }

    fn needs_migration(&self, content: &str) -> bool {
        ["Verticle", "Future", "Promise"]
            .iter()
            .any(|marker| content.contains(marker))
    }

    fn deterministic_rules(&self) -> Vec<Rule> {
        vec![
            Rule::new(
                "io.vertx.core.AbstractVerticle",
                "org.springframework.stereotype.Service",
            ),
            Rule::new("io.vertx.core.Promise", "reactor.core.publisher.Mono"),
            Rule::new("extends AbstractVerticle", ""),
            Rule::new(
                "import io.vertx.core.json.JsonObject;",
                "import com.fasterxml.jackson.databind.JsonNode;",
            ),
        ]
    }

    fn anchor(&self) -> &str {
        WEBFLUX_ANCHOR
    }

    fn initial_instructions(&self, _code: &str) -> String {
        WEBFLUX_PROMPT.to_string()
    }

    fn fix_instructions(&self, code: &str, diagnostic: &str) -> String {
        format!(
            "The refactored code failed to compile.\n\
             ERROR: {diagnostic}\n\n\
             CODE:\n{code}\n\n\
             TASK: Fix the code to satisfy the compiler. Return ONLY the fixed Java code.\n"
        )
    }
}

/// Names accepted by [`strategy_for`].
pub const TARGETS: &[&str] = &["webflux"];

pub fn strategy_for(target: &str) -> Option<Box<dyn MigrationStrategy>> {
    match target.to_ascii_lowercase().as_str() {
        "webflux" => Some(Box::new(WebFluxStrategy)),
        _ => None,
    }
}
