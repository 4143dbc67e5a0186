//! `$STALEWATCH_*` variables for update actions and alert commands.

use std::path::Path;

use rustc_hash::FxHashMap;

pub const FOLDER_VAR: &str = "STALEWATCH_FOLDER";
pub const ACTION_VAR: &str = "STALEWATCH_ACTION";

/// Build the variables describing one dispatch.
pub fn build_vars(folder: &Path, action: &Path) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();
    vars.insert(FOLDER_VAR.into(), folder.display().to_string());
    vars.insert(ACTION_VAR.into(), action.display().to_string());
    vars
}

/// Resolve `$STALEWATCH_*` variables in command arguments
///
/// Longer names are substituted first so `$STALEWATCH_MAIL_TO` is never
/// clobbered by a shorter variable sharing its prefix.
pub fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    let mut keys: Vec<&String> = vars.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    args.iter()
        .map(|arg| {
            let mut result = arg.clone();
            for key in &keys {
                let pattern = format!("${}", key);
                result = result.replace(&pattern, &vars[*key]);
            }
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_args_simple() {
        let vars = build_vars(Path::new("/data/q4"), Path::new("/opt/update.sh"));
        let args = vec![
            "--folder".into(),
            "$STALEWATCH_FOLDER".into(),
            "$STALEWATCH_ACTION.log".into(),
        ];

        let resolved = resolve_args(&args, &vars);
        assert_eq!(resolved[0], "--folder");
        assert_eq!(resolved[1], "/data/q4");
        assert_eq!(resolved[2], "/opt/update.sh.log");
    }

    #[test]
    fn test_resolve_args_no_vars() {
        let vars = FxHashMap::default();
        let args = vec!["echo".into(), "hello".into()];
        assert_eq!(resolve_args(&args, &vars), args);
    }

    #[test]
    fn test_longer_names_win() {
        let mut vars = FxHashMap::default();
        vars.insert("STALEWATCH_MAIL".into(), "short".into());
        vars.insert("STALEWATCH_MAIL_TO".into(), "ops@example.com".into());

        let resolved = resolve_args(&["$STALEWATCH_MAIL_TO".into()], &vars);
        assert_eq!(resolved[0], "ops@example.com");
    }
}
