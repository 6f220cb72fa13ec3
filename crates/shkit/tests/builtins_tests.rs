//! Builtin-driven shell state changes observed through expansion
//!
//! The builtins mutate the variable store, options and frame; these tests
//! check the changes are visible to the expander exactly as a script would
//! see them.

use pretty_assertions::assert_eq;

use shkit::builtins::{Builtin, Colon, Context, Export, Readonly, Set, Unset};
use shkit::expand::scan;
use shkit::{Expander, Frame, OsHost, ShellOptions, VarStore, WordToken};

struct Shell {
    host: OsHost,
    vars: VarStore,
    opts: ShellOptions,
    frame: Frame,
}

impl Shell {
    fn new() -> Self {
        Self {
            host: OsHost::new(),
            vars: VarStore::new(),
            opts: ShellOptions::new(),
            frame: Frame::new(),
        }
    }

    async fn run(&mut self, builtin: &dyn Builtin, args: &[&str]) -> shkit::ExecResult {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let ctx = Context {
            args: &args,
            host: &self.host,
            vars: &mut self.vars,
            opts: &mut self.opts,
            frame: &mut self.frame,
            functions: None,
            jobs: None,
            runner: None,
        };
        builtin.execute(ctx).await.unwrap()
    }

    async fn expand(&mut self, source: &str) -> shkit::Result<Vec<String>> {
        let token = WordToken::new(scan::scan_word(source)?);
        Expander::new(&self.host, &mut self.vars, &self.opts, &self.frame)
            .expand_word(&token)
            .await
    }
}

#[tokio::test]
async fn set_nounset_changes_expansion_behaviour() {
    let mut sh = Shell::new();
    assert!(sh.expand("$missing").await.unwrap().is_empty());

    let res = sh.run(&Set, &["-u"]).await;
    assert!(res.is_success());
    assert!(sh.expand("$missing").await.is_err());

    sh.run(&Set, &["+u"]).await;
    assert!(sh.expand("$missing").await.unwrap().is_empty());
}

#[tokio::test]
async fn set_options_show_up_in_dash_parameter() {
    let mut sh = Shell::new();
    sh.run(&Set, &["-e", "-f"]).await;
    assert_eq!(sh.expand("$-").await.unwrap(), vec!["ef"]);
}

#[tokio::test]
async fn set_replaces_positionals_seen_by_expansion() {
    let mut sh = Shell::new();
    sh.run(&Set, &["--", "first", "second"]).await;
    assert_eq!(sh.expand("$1").await.unwrap(), vec!["first"]);
    assert_eq!(sh.expand("$#").await.unwrap(), vec!["2"]);
    assert_eq!(sh.expand("$@").await.unwrap(), vec!["first", "second"]);
}

#[tokio::test]
async fn export_makes_value_visible_in_envp() {
    let mut sh = Shell::new();
    sh.run(&Export, &["GREETING=hi"]).await;
    assert_eq!(sh.vars.envp(), &["GREETING=hi"]);
    assert_eq!(sh.expand("$GREETING").await.unwrap(), vec!["hi"]);
}

#[tokio::test]
async fn readonly_blocks_later_mutation() {
    let mut sh = Shell::new();
    sh.run(&Readonly, &["LOCKED=1"]).await;

    // expansion-driven assignment fails
    assert!(sh.expand("$((LOCKED = 2))").await.is_err());
    assert!(sh.expand("${LOCKED:=2}").await.unwrap() == vec!["1"]);

    // unset refuses too
    let res = sh.run(&Unset, &["LOCKED"]).await;
    assert_eq!(res.exit_code, 1);
    assert_eq!(sh.vars.value("LOCKED"), Some("1"));
}

#[tokio::test]
async fn unset_removes_from_expansion() {
    let mut sh = Shell::new();
    sh.run(&Export, &["X=1"]).await;
    let res = sh.run(&Unset, &["X"]).await;
    assert!(res.is_success());
    assert!(sh.expand("$X").await.unwrap().is_empty());
    assert!(sh.vars.envp().is_empty());
}

#[tokio::test]
async fn colon_is_inert() {
    let mut sh = Shell::new();
    let before = sh.vars.generation();
    let res = sh.run(&Colon, &["${ignored}", "args"]).await;
    assert!(res.is_success());
    assert_eq!(sh.vars.generation(), before);
}
