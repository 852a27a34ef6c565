//! `cd`, `pwd` and `ls`.

use async_trait::async_trait;

use super::{directories, fail, join_lines, paths};
use crate::core::error::HandlerError;
use crate::core::filesystem::{DirEntry, VirtualFs};
use crate::core::parser::Flags;
use crate::core::registry::{CommandContext, CommandHandler, CompletionContext};

pub struct Cd;

#[async_trait(?Send)]
impl CommandHandler for Cd {
    fn name(&self) -> &str {
        "cd"
    }

    fn description(&self) -> Option<&str> {
        Some("Change the working directory")
    }

    fn category(&self) -> Option<&str> {
        Some("navigation")
    }

    fn usage(&self) -> Option<&str> {
        Some("cd [directory]")
    }

    fn complete(&self, args: &[String], ctx: &CompletionContext<'_>) -> Option<Vec<String>> {
        directories(args, ctx)
    }

    async fn execute(
        &self,
        args: &[String],
        _flags: &Flags,
        ctx: &mut CommandContext<'_>,
    ) -> Result<String, HandlerError> {
        let target = args.first().map(String::as_str).unwrap_or("~");
        Ok(match ctx.vfs.set_cwd(target) {
            Ok(()) => String::new(),
            Err(err) => fail("cd", err),
        })
    }
}

pub struct Pwd;

#[async_trait(?Send)]
impl CommandHandler for Pwd {
    fn name(&self) -> &str {
        "pwd"
    }

    fn description(&self) -> Option<&str> {
        Some("Print the working directory")
    }

    fn category(&self) -> Option<&str> {
        Some("navigation")
    }

    async fn execute(
        &self,
        _args: &[String],
        _flags: &Flags,
        ctx: &mut CommandContext<'_>,
    ) -> Result<String, HandlerError> {
        Ok(ctx.cwd().to_string())
    }
}

// =============================================================================
// ls
// =============================================================================

const LS_MAN: &str = "\
NAME
    ls - list directory contents

SYNOPSIS
    ls [-a] [-l] [path...]

DESCRIPTION
    Lists the entries of each directory given, or of the working directory.
    Directories are shown first and end in '/'.

OPTIONS
    -a    include entries whose names start with '.'
    -l    long format: type, permissions, owner, size and name";

pub struct Ls;

#[async_trait(?Send)]
impl CommandHandler for Ls {
    fn name(&self) -> &str {
        "ls"
    }

    fn description(&self) -> Option<&str> {
        Some("List directory contents")
    }

    fn category(&self) -> Option<&str> {
        Some("navigation")
    }

    fn usage(&self) -> Option<&str> {
        Some("ls [-a] [-l] [path...]")
    }

    fn man_page(&self) -> Option<&str> {
        Some(LS_MAN)
    }

    fn complete(&self, args: &[String], ctx: &CompletionContext<'_>) -> Option<Vec<String>> {
        paths(args, ctx)
    }

    async fn execute(
        &self,
        args: &[String],
        flags: &Flags,
        ctx: &mut CommandContext<'_>,
    ) -> Result<String, HandlerError> {
        let all = flags.any(&["a", "all"]);
        let long = flags.has("l");
        let mut targets = flags.operands(args, &["a", "all", "l"]);
        if targets.is_empty() {
            targets.push(".".to_string());
        }

        let with_headers = targets.len() > 1;
        let sections = targets
            .iter()
            .map(|target| {
                let listing = list_one(ctx.vfs, &ctx.session.user, target, all, long);
                if with_headers && ctx.vfs.is_directory(target) {
                    format!("{target}:\n{listing}")
                } else {
                    listing
                }
            })
            .collect();

        Ok(join_lines(sections))
    }
}

fn list_one(vfs: &VirtualFs, user: &str, target: &str, all: bool, long: bool) -> String {
    let entries = match vfs.stat(target) {
        Ok(entry) if !entry.is_dir => vec![DirEntry {
            name: target.to_string(),
            ..entry
        }],
        Ok(_) => match vfs.list_directory(target) {
            Ok(entries) => entries,
            Err(err) => return fail("ls", err),
        },
        Err(err) => return fail("ls", err),
    };

    let visible = entries.iter().filter(|e| all || !e.name.starts_with('.'));
    if long {
        visible
            .map(|e| long_entry(e, user))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        visible.map(short_name).collect::<Vec<_>>().join("  ")
    }
}

fn short_name(entry: &DirEntry) -> String {
    if entry.is_dir {
        format!("{}/", entry.name)
    } else {
        entry.name.clone()
    }
}

/// `drwxr-xr-x hacker     3 notes/`
fn long_entry(entry: &DirEntry, user: &str) -> String {
    let kind = if entry.is_dir { 'd' } else { '-' };
    let (perms, owner) = match (entry.restricted, entry.is_dir) {
        (true, true) => ("rwx------", "root"),
        (true, false) => ("rw-------", "root"),
        (false, true) => ("rwxr-xr-x", user),
        (false, false) => ("rw-r--r--", user),
    };
    format!("{kind}{perms} {owner:<8} {:>5} {}", entry.size, short_name(entry))
}

#[cfg(test)]
mod tests {
    use crate::core::commands::testing::Session;

    #[tokio::test]
    async fn test_pwd_and_cd() {
        let mut sh = Session::new();
        assert_eq!(sh.run("pwd").await, "/home/hacker");
        assert_eq!(sh.run("cd /var/log").await, "");
        assert_eq!(sh.run("pwd").await, "/var/log");
        assert_eq!(sh.run("cd ../..").await, "");
        assert_eq!(sh.run("pwd").await, "/");
        assert_eq!(sh.run("cd").await, "");
        assert_eq!(sh.run("pwd").await, "/home/hacker");
    }

    #[tokio::test]
    async fn test_cd_errors() {
        let mut sh = Session::new();
        assert_eq!(sh.run("cd /nope").await, "cd: /nope: No such file or directory");
        assert_eq!(sh.run("cd /etc/motd").await, "cd: /etc/motd: Not a directory");
        assert_eq!(sh.run("cd /root").await, "cd: /root: Permission denied");
        assert_eq!(sh.run("pwd").await, "/home/hacker");
    }

    #[tokio::test]
    async fn test_ls_short() {
        let mut sh = Session::new();
        assert_eq!(sh.run("ls").await, "notes/  projects/  readme.txt");
        assert_eq!(sh.run("ls -a").await, "notes/  projects/  readme.txt  .bashrc");
    }

    #[tokio::test]
    async fn test_ls_switch_does_not_eat_path() {
        let mut sh = Session::new();
        assert_eq!(sh.run("ls -a /var").await, "log/");
        let long = sh.run("ls -l /var").await;
        assert!(long.starts_with("drwxr-xr-x hacker"));
        assert!(long.ends_with("log/"));
    }

    #[tokio::test]
    async fn test_ls_long_marks_restricted() {
        let mut sh = Session::new();
        let listing = sh.run("ls -l /etc").await;
        let shadow = listing.lines().find(|l| l.ends_with("shadow")).unwrap();
        assert!(shadow.starts_with("-rw------- root"));
    }

    #[tokio::test]
    async fn test_ls_errors_and_files() {
        let mut sh = Session::new();
        assert_eq!(sh.run("ls /root").await, "ls: /root: Permission denied");
        assert_eq!(sh.run("ls /nope").await, "ls: /nope: No such file or directory");
        assert_eq!(sh.run("ls readme.txt").await, "readme.txt");
    }

    #[tokio::test]
    async fn test_ls_file_inside_restricted_directory() {
        let mut sh = Session::new();
        assert_eq!(
            sh.run("ls -l /root/.flag").await,
            "ls: /root/.flag: Permission denied"
        );
        assert_eq!(sh.run("ls /root/.flag").await, "ls: /root/.flag: Permission denied");
        assert!(sh.run("ls -l /etc/shadow").await.starts_with("-rw------- root"));
    }

    #[tokio::test]
    async fn test_ls_multiple_targets() {
        let mut sh = Session::new();
        assert_eq!(sh.run("ls /var /var/log").await, "/var:\nlog/\n/var/log:\nsyslog");
    }
}
