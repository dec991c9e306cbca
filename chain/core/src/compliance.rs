//! Transfer-permission pipeline
//!
//! Walks a token's delegate chain in order and returns the first denial
//! code, short-circuiting the remaining stages. The precedence between
//! checks (lock, then freeze, then rules, then registry) follows from the
//! chain order of the standard delegate set and is asserted by tests.

use types::errors::CoreError;
use types::outcome::TransferCode;

use crate::delegates::{CheckEnv, ComplianceDelegate, TransferContext};
use crate::metering::ExecutionMeter;

/// Evaluate every check stage of a delegate chain in order.
///
/// Returns the first non-`Ok` code without running later stages. A stage
/// error (unknown rule, exhausted budget) aborts the whole evaluation.
pub fn evaluate_chain(
    chain: &[&dyn ComplianceDelegate],
    env: &CheckEnv<'_>,
    ctx: &TransferContext<'_>,
    meter: &mut ExecutionMeter,
) -> Result<TransferCode, CoreError> {
    for delegate in chain {
        let code = delegate.check_transfer(env, ctx, meter)?;
        if !code.is_ok() {
            tracing::debug!(
                delegate = delegate.name(),
                code = %code,
                "transfer denied"
            );
            return Ok(code);
        }
    }
    Ok(TransferCode::Ok)
}
