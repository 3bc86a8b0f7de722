//! `-ls`/`-fls`: the `ls -dils`-style field formatter.

use crate::eval::EvalState;
use crate::node::Node;
use crate::visit::{Stat, TypeTag};
use chrono::{DateTime, Utc};
use colored::Colorize;

/// Six months, in seconds — the `-ls` "recent file" window boundary.
const RECENT_WINDOW_PAST: i64 = 6 * 30 * 86_400;
const RECENT_WINDOW_FUTURE: i64 = 86_400;

pub fn eval(_node: &Node, state: &mut EvalState) -> bool {
    let Some(stat) = super::stat_or_report(state, Some(false)) else {
        return false;
    };

    let line = format_line(&stat, state);
    println!("{line}");
    true
}

fn format_line(stat: &Stat, state: &EvalState) -> String {
    let blocks_kib = (stat.blocks * 512).div_ceil(1024);
    let mode_str = mode_string(stat.mode, stat.type_tag());
    let acl_marker = ' '; // ACL presence is not consulted here; `-ls` only marks it when known.

    let owner = state
        .config
        .user_group
        .lookup_uid(stat.uid)
        .map(|p| p.name)
        .unwrap_or_else(|| stat.uid.to_string());
    let group = state
        .config
        .user_group
        .lookup_gid(stat.gid)
        .map(|g| g.name)
        .unwrap_or_else(|| stat.gid.to_string());

    let size_field = match stat.type_tag() {
        TypeTag::Block | TypeTag::Char => {
            let major = nix::sys::stat::major(stat.rdev);
            let minor = nix::sys::stat::minor(stat.rdev);
            format!("{major:3}, {minor:3}")
        }
        _ => format!("{}", stat.size),
    };

    let time_field = format_time(stat.mtime.0);

    let path = state.visit.path_str();
    let mut line = format!(
        "{:9} {:6} {}{} {:2} {:<8} {:<8} {} {} {}",
        stat.ino,
        blocks_kib,
        mode_str,
        acl_marker,
        stat.nlink,
        owner,
        group,
        size_field,
        time_field,
        path.cyan()
    );

    if stat.type_tag() == TypeTag::Symlink {
        if let Ok(target) = std::fs::read_link(state.visit.path.as_path()) {
            line.push_str(" -> ");
            line.push_str(&target.to_string_lossy());
        }
    }

    line
}

fn format_time(mtime_secs: i64) -> String {
    let now = crate::time_util::PROGRAM_START.0;
    let Some(dt) = DateTime::<Utc>::from_timestamp(mtime_secs, 0) else {
        return String::new();
    };
    if mtime_secs > now - RECENT_WINDOW_PAST && mtime_secs < now + RECENT_WINDOW_FUTURE {
        dt.format("%b %e %H:%M").to_string()
    } else {
        dt.format("%b %e  %Y").to_string()
    }
}

fn mode_string(mode: u32, type_tag: TypeTag) -> String {
    let type_char = match type_tag {
        TypeTag::Directory => 'd',
        TypeTag::Symlink => 'l',
        TypeTag::Block => 'b',
        TypeTag::Char => 'c',
        TypeTag::Fifo => 'p',
        TypeTag::Socket => 's',
        TypeTag::Door => 'D',
        TypeTag::Whiteout => 'w',
        _ => '-',
    };

    let triplet = |read: u32, write: u32, exec: u32, setid: u32, setid_char: char| {
        let r = if mode & read != 0 { 'r' } else { '-' };
        let w = if mode & write != 0 { 'w' } else { '-' };
        let x = if mode & setid != 0 {
            setid_char
        } else if mode & exec != 0 {
            'x'
        } else {
            '-'
        };
        format!("{r}{w}{x}")
    };

    let user = triplet(0o400, 0o200, 0o100, 0o4000, if mode & 0o100 != 0 { 's' } else { 'S' });
    let group = triplet(0o040, 0o020, 0o010, 0o2000, if mode & 0o010 != 0 { 's' } else { 'S' });
    let sticky_x = mode & 0o001 != 0;
    let other_exec_char = match (mode & 0o1000 != 0, sticky_x) {
        (true, true) => 't',
        (true, false) => 'T',
        (false, true) => 'x',
        (false, false) => '-',
    };
    let other = format!(
        "{}{}{}",
        if mode & 0o004 != 0 { 'r' } else { '-' },
        if mode & 0o002 != 0 { 'w' } else { '-' },
        other_exec_char
    );

    format!("{type_char}{user}{group}{other}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_string_renders_rwx_triplets() {
        assert_eq!(mode_string(0o755, TypeTag::Regular), "-rwxr-xr-x");
        assert_eq!(mode_string(0o644, TypeTag::Directory), "drw-r--r--");
    }

    #[test]
    fn mode_string_renders_setuid_and_sticky() {
        assert_eq!(mode_string(0o4755, TypeTag::Regular), "-rwsr-xr-x");
        assert_eq!(mode_string(0o1777, TypeTag::Directory), "drwxrwxrwt");
    }
}
