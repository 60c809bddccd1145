//! Integration tests for environment-driven context resolution

use super::test_utils::{with_env_var, ENV_MUTEX};
use strata::context::{CONTEXT_ENV_VAR, LOCAL_DEV_ENV_VAR};
use strata::{ConfigError, Context};

#[test]
fn test_env_override_drives_resolution() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    with_env_var(CONTEXT_ENV_VAR, Some("Production/Qa"), || {
        let ctx = Context::resolve().unwrap();
        assert_eq!(ctx.to_string(), "Production/Qa");
        let chain: Vec<String> = ctx.ancestors().iter().map(Context::to_string).collect();
        assert_eq!(chain, vec!["Production", "Production/Qa"]);
    });
}

#[test]
fn test_unset_env_falls_back_to_production() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    with_env_var(CONTEXT_ENV_VAR, None, || {
        let ctx = Context::resolve().unwrap();
        assert!(ctx.is_production());
        assert!(ctx.parent().is_none());
    });
}

#[test]
fn test_invalid_env_context_aborts_resolution() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    with_env_var(CONTEXT_ENV_VAR, Some("Sandbox/Qa"), || {
        assert!(matches!(
            Context::resolve(),
            Err(ConfigError::InvalidContext(_))
        ));
    });
}

#[test]
fn test_blank_env_context_is_treated_as_unset() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    with_env_var(CONTEXT_ENV_VAR, Some("   "), || {
        let ctx = Context::resolve().unwrap();
        assert!(ctx.is_production());
    });
}

#[test]
fn test_local_dev_flag_variants() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    with_env_var(LOCAL_DEV_ENV_VAR, Some("TRUE"), || {
        assert!(Context::local_dev_environment());
    });
    with_env_var(LOCAL_DEV_ENV_VAR, Some("1"), || {
        assert!(Context::local_dev_environment());
    });
    with_env_var(LOCAL_DEV_ENV_VAR, Some("false"), || {
        assert!(!Context::local_dev_environment());
    });
    with_env_var(LOCAL_DEV_ENV_VAR, None, || {
        assert!(!Context::local_dev_environment());
    });
}
