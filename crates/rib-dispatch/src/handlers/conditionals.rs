//! `IfBegin`/`ElseIf`/`Else`/`IfEnd` (spec §4.7): evaluates the "simple
//! attribute-expression language" spec §9 leaves open against the render
//! context's `$name` variable table, since `rib-state::ConditionalStack`
//! only tracks which branch is active and delegates evaluation to us.

use crate::args::Args;
use crate::context::Context;
use rib_backend::BackendResult;
use rib_errors::ErrorReporter;
use rib_model::Value;
use rib_state::{ConditionEvaluator, ModeKind};

/// Evaluates a conditional expression by substituting `$name` variables and
/// then reading the result as a truth value: empty, `"0"`, and `"false"`
/// (case-insensitively) are false; anything else, including an
/// unsubstituted literal, is true.
struct VariableConditionEvaluator<'a> {
    variables: &'a rib_config::VariableTable,
}

impl ConditionEvaluator for VariableConditionEvaluator<'_> {
    fn evaluate(&self, expression: &str) -> bool {
        let substituted = self.variables.substitute(expression.trim());
        !matches!(substituted.to_ascii_lowercase().as_str(), "" | "0" | "false")
    }
}

fn evaluate(ctx: &Context, expression: &str) -> bool {
    let evaluator = VariableConditionEvaluator {
        variables: &ctx.config.variables,
    };
    evaluator.evaluate(expression)
}

pub fn if_begin(ctx: &mut Context, positional: &[Value], reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    let source_name = ctx.source_name().to_string();
    if let Err(diagnostic) = ctx.modes.push(ModeKind::If, line, &source_name) {
        reporter.report(diagnostic);
        return Ok(());
    }
    let expression = Args::new(positional, "IfBegin", line, ctx.source_name()).string(0, reporter);
    let result = evaluate(ctx, &expression);
    ctx.conditionals.if_begin(result);
    Ok(())
}

pub fn else_if(ctx: &mut Context, positional: &[Value], reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    let expression = Args::new(positional, "ElseIf", line, ctx.source_name()).string(0, reporter);
    let result = evaluate(ctx, &expression);
    ctx.conditionals.else_if(result);
    Ok(())
}

pub fn else_branch(ctx: &mut Context) -> BackendResult<()> {
    ctx.conditionals.else_branch();
    Ok(())
}

pub fn if_end(ctx: &mut Context, reporter: &mut dyn ErrorReporter, line: u32) -> BackendResult<()> {
    let source_name = ctx.source_name().to_string();
    if let Err(diagnostic) = ctx.modes.pop(ModeKind::If, line, &source_name) {
        reporter.report(diagnostic);
        return Ok(());
    }
    ctx.conditionals.if_end();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_variable_substitution_drives_evaluation() {
        let mut config = rib_config::RenderConfig::new();
        config.variables.set("FLAG", "1");
        let ctx = Context::new(config, "a.rib");
        assert!(evaluate(&ctx, "$FLAG"));
    }

    #[test]
    fn literal_zero_is_false() {
        let ctx = Context::new(rib_config::RenderConfig::new(), "a.rib");
        assert!(!evaluate(&ctx, "0"));
    }
}
