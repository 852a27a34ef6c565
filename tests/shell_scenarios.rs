//! End-to-end sessions driven through the public engine API.

use hackshell::config::ShellConfig;
use hackshell::core::render::Rendered;
use hackshell::core::{
    BufferRenderer, CompletionState, MemoryStorage, ShellEngine, SubmitOutcome,
};

fn shell() -> ShellEngine<BufferRenderer> {
    ShellEngine::in_memory(BufferRenderer::new())
}

/// Submit `line` and return what it printed (outputs and errors, in order).
async fn run(sh: &mut ShellEngine<BufferRenderer>, line: &str) -> Vec<String> {
    let before = sh.renderer().lines.len();
    sh.submit(line).await;
    sh.renderer().lines[before..]
        .iter()
        .filter_map(|l| match l {
            Rendered::Output(text) | Rendered::Error(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_tab_then_enter() {
    let mut sh = shell();
    let line = sh.complete("cd /et").expect("completion");
    assert_eq!(line, "cd /etc/");
    assert!(run(&mut sh, &line).await.is_empty());
    assert_eq!(sh.prompt(), "hacker@hacksim:/etc");
}

#[tokio::test]
async fn test_tab_cycles_then_keystroke_restarts() {
    let mut sh = shell();
    assert_eq!(sh.complete("cd ").as_deref(), Some("cd notes/"));
    assert_eq!(sh.complete("cd notes/").as_deref(), Some("cd projects/"));
    assert_eq!(sh.complete("cd projects/").as_deref(), Some("cd notes/"));

    sh.on_keystroke();
    assert_eq!(sh.completion_state(), &CompletionState::Idle);
    assert_eq!(sh.complete("cd p").as_deref(), Some("cd projects/"));
}

#[tokio::test]
async fn test_restricted_files_stay_hidden() {
    let mut sh = shell();
    assert_eq!(
        run(&mut sh, "cat /etc/shadow").await,
        vec!["cat: /etc/shadow: Permission denied"]
    );
    assert_eq!(
        run(&mut sh, "cat /root/.flag").await,
        vec!["cat: /root/.flag: Permission denied"]
    );
    assert_eq!(
        run(&mut sh, "cp /etc/shadow /tmp").await,
        vec!["cp: /etc/shadow: Permission denied"]
    );
    assert!(!sh.vfs().exists("/tmp/shadow"));
}

#[tokio::test]
async fn test_build_a_project_tree() {
    let mut sh = shell();
    assert_eq!(
        run(&mut sh, "mkdir projects/site/css").await,
        vec!["mkdir: /home/hacker/projects/site: No such file or directory"]
    );
    run(&mut sh, "mkdir -p projects/site/css").await;
    run(&mut sh, "cd projects/site").await;
    run(&mut sh, "touch index.html css/main.css").await;

    assert_eq!(run(&mut sh, "ls").await, vec!["css/  index.html"]);
    assert_eq!(run(&mut sh, "ls css").await, vec!["main.css"]);
    assert_eq!(sh.prompt(), "hacker@hacksim:~/projects/site");
}

#[tokio::test]
async fn test_moving_the_working_directory_follows_it() {
    let mut sh = shell();
    run(&mut sh, "cd notes").await;
    assert!(run(&mut sh, "mv /home/hacker/notes /tmp/archive").await.is_empty());
    assert_eq!(run(&mut sh, "pwd").await, vec!["/tmp/archive"]);
    assert!(sh.vfs().exists("/tmp/archive/todo.txt"));
}

#[tokio::test]
async fn test_removing_the_working_directory() {
    let mut sh = shell();
    run(&mut sh, "cd projects").await;
    run(&mut sh, "rm -r /home/hacker/projects").await;
    assert_eq!(run(&mut sh, "pwd").await, vec!["/home/hacker"]);
}

#[tokio::test]
async fn test_typo_gets_a_suggestion() {
    let mut sh = shell();
    let outcome = sh.submit("lss").await;
    assert_eq!(
        outcome,
        SubmitOutcome::NotFound {
            suggestion: Some("ls".into())
        }
    );
    assert_eq!(sh.renderer().infos(), vec!["Did you mean 'ls'?"]);
}

#[tokio::test]
async fn test_clear_then_history() {
    let mut sh = shell();
    run(&mut sh, "whoami").await;
    run(&mut sh, "clear").await;
    assert!(sh.renderer().lines.is_empty());

    assert_eq!(
        run(&mut sh, "history").await,
        vec!["  1  whoami\n  2  clear\n  3  history"]
    );
    assert_eq!(sh.history_previous().as_deref(), Some("history"));
}

#[tokio::test]
async fn test_reload_restores_session() {
    let fs = MemoryStorage::new();
    let history = MemoryStorage::new();
    let boot = || {
        ShellEngine::new(
            ShellConfig::default(),
            BufferRenderer::new(),
            Box::new(fs.clone()),
            Box::new(history.clone()),
        )
    };

    let mut first = boot();
    run(&mut first, "touch /tmp/note.txt").await;
    run(&mut first, "rm /home/hacker/readme.txt").await;
    drop(first);

    let mut second = boot();
    assert!(second.vfs().exists("/tmp/note.txt"));
    assert!(!second.vfs().exists("/home/hacker/readme.txt"));
    assert_eq!(second.history_previous().as_deref(), Some("rm /home/hacker/readme.txt"));

    run(&mut second, "reset").await;
    let third = boot();
    assert!(third.vfs().exists("/home/hacker/readme.txt"));
}

#[tokio::test]
async fn test_corrupt_snapshot_boots_stock_tree() {
    let fs = MemoryStorage::with_blob("{not json");
    let history = MemoryStorage::with_blob("also not json");
    let mut sh = ShellEngine::new(
        ShellConfig::default(),
        BufferRenderer::new(),
        Box::new(fs),
        Box::new(history),
    );
    assert!(sh.history().is_empty());
    assert_eq!(run(&mut sh, "cat ~/notes/todo.txt").await.len(), 1);
    assert_eq!(sh.prompt(), "hacker@hacksim:~");
}

#[tokio::test]
async fn test_custom_identity() {
    let config = ShellConfig {
        user: "trinity".into(),
        hostname: "nebuchadnezzar".into(),
        history_capacity: 2,
    };
    let mut sh = ShellEngine::new(
        config,
        BufferRenderer::new(),
        Box::new(MemoryStorage::new()),
        Box::new(MemoryStorage::new()),
    );
    run(&mut sh, "cd /tmp").await;
    assert_eq!(sh.prompt(), "trinity@nebuchadnezzar:/tmp");
    assert_eq!(run(&mut sh, "whoami").await, vec!["trinity"]);

    run(&mut sh, "pwd").await;
    assert_eq!(sh.history().entries(), vec!["whoami", "pwd"]);
}
