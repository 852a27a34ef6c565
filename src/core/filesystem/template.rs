//! The stock filesystem every new session starts from.

use super::FsNode;
use crate::config::{DEFAULT_HOSTNAME, DEFAULT_USER};

const README: &str = "\
Welcome to the training box.

Look around with `ls` and `cd`, read files with `cat`.
Some files are off limits; finding out which is part of the fun.
Type `help` for the list of commands, `man <command>` for details.
";

const TODO: &str = "\
- learn the difference between absolute and relative paths
- find out who else has an account on this machine
- clean up /tmp
";

const BASHRC: &str = "\
# ~/.bashrc
export PS1='\\u@\\h:\\w$ '
alias ll='ls -l'
";

const MOTD: &str = "Authorized use only. All activity may be monitored.\n";

const SYSLOG: &str = "\
Jan 12 06:25:01 hacksim CRON[812]: (root) CMD (run-parts /etc/cron.daily)
Jan 12 07:02:44 hacksim sshd[1021]: Failed password for root from 10.0.0.23 port 51022
Jan 12 07:02:51 hacksim sshd[1021]: Accepted password for hacker from 10.0.0.23 port 51034
";

const SHADOW: &str = "\
root:$6$Qx1f$Wm2x9Y1.:19000:0:99999:7:::
hacker:$6$Lz0p$T0pS3cr3t.:19000:0:99999:7:::
";

fn passwd() -> String {
    format!(
        "root:x:0:0:root:/root:/bin/bash\n\
         {user}:x:1000:1000:{user}:/home/{user}:/bin/bash\n\
         nobody:x:65534:65534:nobody:/nonexistent:/usr/sbin/nologin\n",
        user = DEFAULT_USER
    )
}

/// Build a fresh copy of the stock tree.
pub fn stock_tree() -> FsNode {
    let home = FsNode::directory()
        .with_child("readme.txt", FsNode::file(README))
        .with_child(".bashrc", FsNode::file(BASHRC))
        .with_child(
            "notes",
            FsNode::directory().with_child("todo.txt", FsNode::file(TODO)),
        )
        .with_child("projects", FsNode::directory());

    FsNode::directory()
        .with_child("bin", FsNode::directory())
        .with_child(
            "etc",
            FsNode::directory()
                .with_child("hostname", FsNode::file(format!("{}\n", DEFAULT_HOSTNAME)))
                .with_child("motd", FsNode::file(MOTD))
                .with_child("passwd", FsNode::file(passwd()))
                .with_child("shadow", FsNode::file(SHADOW).restricted()),
        )
        .with_child(
            "home",
            FsNode::directory().with_child(DEFAULT_USER, home),
        )
        .with_child(
            "root",
            FsNode::directory()
                .with_child(".flag", FsNode::file("FLAG{you_should_not_see_this}\n"))
                .restricted(),
        )
        .with_child("tmp", FsNode::directory())
        .with_child(
            "var",
            FsNode::directory().with_child(
                "log",
                FsNode::directory().with_child("syslog", FsNode::file(SYSLOG)),
            ),
        )
}
