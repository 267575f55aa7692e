use anyhow::{Context, anyhow, bail};
use std::str::FromStr;
use sweeper_core::{Coord, Coord2};

/// A single scripted player action, written as `o<row>,<col>`, `f<row>,<col>` or `lose`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Move {
    Open(Coord2),
    Flag(Coord2),
    Lose,
}

impl FromStr for Move {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("lose") {
            return Ok(Move::Lose);
        }

        let mut chars = s.chars();
        let kind = chars.next().ok_or_else(|| anyhow!("empty move"))?;
        let coords = parse_coords(chars.as_str()).with_context(|| format!("in move {s:?}"))?;

        match kind.to_ascii_lowercase() {
            'o' => Ok(Move::Open(coords)),
            'f' => Ok(Move::Flag(coords)),
            other => bail!("unknown move kind {other:?}, expected 'o' or 'f'"),
        }
    }
}

fn parse_coords(s: &str) -> anyhow::Result<Coord2> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| anyhow!("expected <row>,<col>"))?;
    let row: Coord = row.trim().parse().context("invalid row")?;
    let col: Coord = col.trim().parse().context("invalid col")?;
    Ok((row, col))
}
