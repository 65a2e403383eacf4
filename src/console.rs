use std::path::Path;

use skeletal::{Skeleton, SkeletonError};
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("no skeleton is loaded; run \"loadskel <file>\" first")]
    NothingLoaded,

    #[error(transparent)]
    Skeleton(#[from] SkeletonError),
}

/// Command console owning the currently loaded skeleton.
///
/// The loaded skeleton is explicit state passed around with the console, not
/// a process-wide global; a failed load keeps the previous skeleton.
#[derive(Default)]
pub struct Console {
    skeleton: Option<Skeleton>,
}

impl Console {
    pub fn loaded_skeleton(&self) -> Option<&Skeleton> {
        self.skeleton.as_ref()
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), CommandError> {
        let skeleton = Skeleton::read_from_file(path)?;
        self.skeleton = Some(skeleton);
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CommandError> {
        let Some(skeleton) = &self.skeleton else {
            return Err(CommandError::NothingLoaded);
        };
        skeleton.write_to_file(path)?;
        Ok(())
    }

    /// One formatted line per joint of the loaded skeleton.
    pub fn joint_lines(&self) -> Result<Vec<String>, CommandError> {
        let Some(skeleton) = &self.skeleton else {
            return Err(CommandError::NothingLoaded);
        };

        let mut lines = Vec::with_capacity(skeleton.joint_count() as usize);
        for (i, joint) in skeleton.joints().iter().enumerate() {
            let parent = if joint.is_root() {
                "-".to_string()
            } else {
                joint.parent_index().to_string()
            };
            let translation = skeleton.world_bone_to_model(i as u32).w_axis;
            lines.push(format!(
                "{i:4}  {:<24} parent {parent:>4}  at ({:.3}, {:.3}, {:.3})",
                joint.name(),
                translation.x,
                translation.y,
                translation.z,
            ));
        }
        Ok(lines)
    }

    /// Handles one console line. Returns `false` when the console should
    /// quit. Errors are reported and leave the console state untouched.
    pub fn handle_line(&mut self, line: &str) -> bool {
        let tokens = split_line(line);
        let Some((verb, args)) = tokens.split_first() else {
            return true;
        };

        let result = match *verb {
            "loadskel" => match args {
                [path] => self.load(path),
                _ => Err(CommandError::Usage("loadskel <filename>")),
            },
            "saveskel" => match args {
                [path] => self.save(path),
                _ => Err(CommandError::Usage("saveskel <filename>")),
            },
            "joints" => self.joint_lines().map(|lines| {
                for line in lines {
                    println!("{line}");
                }
            }),
            "help" => {
                println!("loadskel <filename>   load a skeleton file");
                println!("saveskel <filename>   save the loaded skeleton");
                println!("joints                list the loaded hierarchy");
                println!("quit                  leave the console");
                Ok(())
            }
            "quit" | "exit" => return false,
            unknown => {
                error!("Unknown command: {unknown}");
                Ok(())
            }
        };

        if let Err(err) = result {
            error!("{err}");
        }
        true
    }
}

/// Splits a console line into tokens. Quoted strings are treated as a single
/// token (without quotes), so filenames may contain spaces.
fn split_line(line: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut in_string = false;
    let mut token_start: Option<usize> = None;

    for (i, ch) in line.char_indices() {
        match ch {
            '"' => {
                if in_string {
                    if let Some(start) = token_start {
                        result.push(&line[start..i]);
                        token_start = None;
                    }
                    in_string = false;
                } else {
                    in_string = true;
                    token_start = Some(i + 1);
                }
            }

            ch if ch.is_whitespace() => {
                if !in_string {
                    if let Some(start) = token_start {
                        result.push(&line[start..i]);
                        token_start = None;
                    }
                }
            }

            _ => {
                if token_start.is_none() {
                    token_start = Some(i);
                }
            }
        }
    }

    if let Some(start) = token_start {
        result.push(&line[start..]);
    }

    result
}
