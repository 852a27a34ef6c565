//! File manipulation: `cat`, `mkdir`, `touch`, `rm`, `cp`, `mv`.

use async_trait::async_trait;

use super::{all_flags, directories, fail, join_lines, missing_operand, paths};
use crate::core::error::{HandlerError, VfsError};
use crate::core::parser::Flags;
use crate::core::registry::{CommandContext, CommandHandler, CompletionContext};

const RECURSIVE: &[&str] = &["r", "R", "recursive"];

pub struct Cat;

#[async_trait(?Send)]
impl CommandHandler for Cat {
    fn name(&self) -> &str {
        "cat"
    }

    fn description(&self) -> Option<&str> {
        Some("Print file contents")
    }

    fn category(&self) -> Option<&str> {
        Some("files")
    }

    fn usage(&self) -> Option<&str> {
        Some("cat <file...>")
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
        let files = flags.operands(args, &all_flags(flags));
        if files.is_empty() {
            return Ok(missing_operand("cat"));
        }

        let pieces = files
            .iter()
            .map(|path| match ctx.vfs.read_file(path) {
                Ok(content) => content.trim_end_matches('\n').to_string(),
                Err(err) => fail("cat", err),
            })
            .collect();
        Ok(join_lines(pieces))
    }
}

pub struct Mkdir;

#[async_trait(?Send)]
impl CommandHandler for Mkdir {
    fn name(&self) -> &str {
        "mkdir"
    }

    fn description(&self) -> Option<&str> {
        Some("Create directories")
    }

    fn category(&self) -> Option<&str> {
        Some("files")
    }

    fn usage(&self) -> Option<&str> {
        Some("mkdir [-p] <directory...>")
    }

    fn complete(&self, args: &[String], ctx: &CompletionContext<'_>) -> Option<Vec<String>> {
        directories(args, ctx)
    }

    async fn execute(
        &self,
        args: &[String],
        flags: &Flags,
        ctx: &mut CommandContext<'_>,
    ) -> Result<String, HandlerError> {
        let parents = flags.any(&["p", "parents"]);
        let targets = flags.operands(args, &["p", "parents"]);
        if targets.is_empty() {
            return Ok(missing_operand("mkdir"));
        }

        let errors = targets
            .iter()
            .filter_map(|path| ctx.vfs.create_directory(path, parents).err())
            .map(|err| fail("mkdir", err))
            .collect();
        Ok(join_lines(errors))
    }
}

pub struct Touch;

#[async_trait(?Send)]
impl CommandHandler for Touch {
    fn name(&self) -> &str {
        "touch"
    }

    fn description(&self) -> Option<&str> {
        Some("Create empty files")
    }

    fn category(&self) -> Option<&str> {
        Some("files")
    }

    fn usage(&self) -> Option<&str> {
        Some("touch <file...>")
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
        let files = flags.operands(args, &all_flags(flags));
        if files.is_empty() {
            return Ok(missing_operand("touch"));
        }

        let mut errors = Vec::new();
        for path in &files {
            if ctx.vfs.exists(path) {
                continue;
            }
            if let Err(err) = ctx.vfs.create_file(path, "") {
                errors.push(fail("touch", err));
            }
        }
        Ok(join_lines(errors))
    }
}

pub struct Rm;

#[async_trait(?Send)]
impl CommandHandler for Rm {
    fn name(&self) -> &str {
        "rm"
    }

    fn description(&self) -> Option<&str> {
        Some("Remove files and directories")
    }

    fn category(&self) -> Option<&str> {
        Some("files")
    }

    fn usage(&self) -> Option<&str> {
        Some("rm [-r] [-f] <path...>")
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
        let recursive = flags.any(RECURSIVE);
        let force = flags.any(&["f", "force"]);
        let targets = flags.operands(args, &["r", "R", "recursive", "f", "force"]);
        if targets.is_empty() {
            return Ok(if force { String::new() } else { missing_operand("rm") });
        }

        let mut errors = Vec::new();
        for path in &targets {
            match ctx.vfs.delete(path, recursive) {
                Ok(()) => {}
                Err(VfsError::NotFound(_)) if force => {}
                Err(err) => errors.push(fail("rm", err)),
            }
        }
        Ok(join_lines(errors))
    }
}

pub struct Cp;

#[async_trait(?Send)]
impl CommandHandler for Cp {
    fn name(&self) -> &str {
        "cp"
    }

    fn description(&self) -> Option<&str> {
        Some("Copy files and directories")
    }

    fn category(&self) -> Option<&str> {
        Some("files")
    }

    fn usage(&self) -> Option<&str> {
        Some("cp [-r] <source> <destination>")
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
        let operands = flags.operands(args, RECURSIVE);
        let [source, destination] = operands.as_slice() else {
            return Ok(missing_operand("cp"));
        };

        if ctx.vfs.is_directory(source) && !flags.any(RECURSIVE) {
            return Ok(format!("cp: -r not specified; omitting directory '{source}'"));
        }

        Ok(match ctx.vfs.copy(source, destination) {
            Ok(_) => String::new(),
            Err(err) => fail("cp", err),
        })
    }
}

pub struct Mv;

#[async_trait(?Send)]
impl CommandHandler for Mv {
    fn name(&self) -> &str {
        "mv"
    }

    fn description(&self) -> Option<&str> {
        Some("Move or rename files and directories")
    }

    fn category(&self) -> Option<&str> {
        Some("files")
    }

    fn usage(&self) -> Option<&str> {
        Some("mv <source> <destination>")
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
        let operands = flags.operands(args, &all_flags(flags));
        let [source, destination] = operands.as_slice() else {
            return Ok(missing_operand("mv"));
        };

        Ok(match ctx.vfs.move_node(source, destination) {
            Ok(_) => String::new(),
            Err(err) => fail("mv", err),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::core::commands::testing::Session;

    #[tokio::test]
    async fn test_cat() {
        let mut sh = Session::new();
        assert!(sh.run("cat readme.txt").await.starts_with("Welcome"));
        assert_eq!(sh.run("cat").await, "cat: missing operand");
        assert_eq!(sh.run("cat /etc").await, "cat: /etc: Is a directory");
    }

    #[tokio::test]
    async fn test_cat_restricted_never_leaks() {
        let mut sh = Session::new();
        let out = sh.run("cat /etc/shadow").await;
        assert_eq!(out, "cat: /etc/shadow: Permission denied");
        assert!(!out.contains("$6$"));
    }

    #[tokio::test]
    async fn test_mkdir_and_touch() {
        let mut sh = Session::new();
        assert_eq!(sh.run("mkdir work").await, "");
        assert_eq!(sh.run("touch work/a.txt work/b.txt").await, "");
        assert_eq!(sh.run("ls work").await, "a.txt  b.txt");
        assert_eq!(sh.run("mkdir work").await, "mkdir: /home/hacker/work: File exists");
    }

    #[tokio::test]
    async fn test_mkdir_missing_parent() {
        let mut sh = Session::new();
        assert_eq!(
            sh.run("mkdir a/b").await,
            "mkdir: /home/hacker/a: No such file or directory"
        );
        assert_eq!(sh.run("mkdir -p a/b").await, "");
        assert!(sh.vfs.is_directory("~/a/b"));
    }

    #[tokio::test]
    async fn test_touch_keeps_existing_content() {
        let mut sh = Session::new();
        let before = sh.run("cat readme.txt").await;
        sh.run("touch readme.txt").await;
        assert_eq!(sh.run("cat readme.txt").await, before);
    }

    #[tokio::test]
    async fn test_rm() {
        let mut sh = Session::new();
        assert_eq!(
            sh.run("rm notes").await,
            "rm: /home/hacker/notes: Directory not empty"
        );
        assert_eq!(sh.run("rm -r notes").await, "");
        assert!(!sh.vfs.exists("~/notes"));
        assert_eq!(sh.run("rm -f ghost").await, "");
        assert_eq!(sh.run("rm ghost").await, "rm: /home/hacker/ghost: No such file or directory");
        assert_eq!(sh.run("rm -rf /").await, "rm: /: Cannot remove root directory");
    }

    #[tokio::test]
    async fn test_rm_refuses_restricted_subtree() {
        let mut sh = Session::new();
        assert_eq!(sh.run("rm -r /etc").await, "rm: /etc: Permission denied");
        assert!(sh.vfs.exists("/etc/passwd"));
    }

    #[tokio::test]
    async fn test_cp() {
        let mut sh = Session::new();
        assert_eq!(sh.run("cp readme.txt /tmp").await, "");
        assert_eq!(sh.run("cat /tmp/readme.txt").await, sh.run("cat readme.txt").await);
        assert_eq!(
            sh.run("cp notes /tmp").await,
            "cp: -r not specified; omitting directory 'notes'"
        );
        assert_eq!(sh.run("cp -r notes /tmp").await, "");
        assert!(sh.vfs.exists("/tmp/notes/todo.txt"));
        assert_eq!(sh.run("cp readme.txt").await, "cp: missing operand");
    }

    #[tokio::test]
    async fn test_switches_do_not_swallow_operands() {
        let mut sh = Session::new();
        assert!(sh.run("cat -n readme.txt").await.starts_with("Welcome"));
        assert_eq!(sh.run("touch -c fresh.txt").await, "");
        assert!(sh.vfs.exists("fresh.txt"));
        assert_eq!(sh.run("mv -f fresh.txt moved.txt").await, "");
        assert!(sh.vfs.exists("moved.txt"));
        assert!(!sh.vfs.exists("fresh.txt"));
    }

    #[tokio::test]
    async fn test_mv() {
        let mut sh = Session::new();
        assert_eq!(sh.run("mv readme.txt intro.txt").await, "");
        assert!(!sh.vfs.exists("readme.txt"));
        assert!(sh.run("cat intro.txt").await.starts_with("Welcome"));
        assert_eq!(
            sh.run("mv notes notes/deeper").await,
            "mv: /home/hacker/notes: Destination is the source or inside it"
        );
        assert_eq!(
            sh.run("mv intro.txt ./intro.txt").await,
            "mv: /home/hacker/intro.txt: Destination is the source or inside it"
        );
        assert!(sh.vfs.exists("intro.txt"));
    }
}
