use crate::error::ConfigurationError;

/// The only character that places nothing.
pub const BACKGROUND: char = ' ';

/// A rectangular ASCII map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiMap {
    rows: Vec<Vec<char>>,
}

impl AsciiMap {
    /// Parses a map literal. Empty lines at the start and end are dropped.
    /// Rows of background cells are part of the map.
    pub fn parse(map: &str) -> Result<AsciiMap, ConfigurationError> {
        let lines: Vec<&str> = map.lines().collect();
        let first = lines.iter().position(|l| !l.is_empty());
        let last = lines.iter().rposition(|l| !l.is_empty());
        let (first, last) = match (first, last) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(ConfigurationError::EmptyGrid),
        };
        let rows: Vec<Vec<char>> = lines[first..=last]
            .iter()
            .map(|l| l.chars().collect())
            .collect();
        let expected = rows[0].len();
        for (row, chars) in rows.iter().enumerate() {
            if chars.len() != expected {
                return Err(ConfigurationError::RaggedGrid {
                    row,
                    expected,
                    found: chars.len(),
                });
            }
        }
        Ok(AsciiMap { rows })
    }

    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        (0..self.width() as i64).contains(&x) && (0..self.height() as i64).contains(&y)
    }

    /// Every non-background cell as `(row, column, character)`, in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, chars)| {
            chars
                .iter()
                .enumerate()
                .filter(|(_, c)| **c != BACKGROUND)
                .map(move |(column, c)| (row, column, *c))
        })
    }

    /// `(row, column)` of every occurrence of `character`, in row-major order.
    pub fn positions(&self, character: char) -> Vec<(usize, usize)> {
        self.cells()
            .filter(|(_, _, c)| *c == character)
            .map(|(row, column, _)| (row, column))
            .collect()
    }

    /// Reassembles the map as newline-terminated rows.
    pub fn to_map_string(&self) -> String {
        let mut map = String::new();
        for row in &self.rows {
            map.extend(row.iter());
            map.push('\n');
        }
        map
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_strips_blank_edges() {
        let map = AsciiMap::parse("\n#P#\n#O#\n\n").unwrap();
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 2);
        assert_eq!(map.to_map_string(), "#P#\n#O#\n");
    }

    #[test]
    fn test_background_edge_rows_are_kept() {
        let map = AsciiMap::parse("\n   \n#P#\n   \n").unwrap();
        assert_eq!(map.height(), 3);
        assert_eq!(map.positions('P'), vec![(1, 1)]);
        assert_eq!(map.to_map_string(), "   \n#P#\n   \n");
    }

    #[test]
    fn test_positions_row_major() {
        let map = AsciiMap::parse("P P\n P \n").unwrap();
        assert_eq!(map.positions('P'), vec![(0, 0), (0, 2), (1, 1)]);
        assert!(map.positions('#').is_empty());
        assert_eq!(map.cells().count(), 3);
    }

    #[test]
    fn test_ragged_map() {
        assert!(matches!(
            AsciiMap::parse("###\n##\n"),
            Err(ConfigurationError::RaggedGrid {
                row: 1,
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn test_empty_map() {
        assert!(matches!(
            AsciiMap::parse("\n\n"),
            Err(ConfigurationError::EmptyGrid)
        ));
    }

    #[test]
    fn test_contains() {
        let map = AsciiMap::parse("###\n###\n").unwrap();
        assert!(map.contains(2, 1));
        assert!(!map.contains(3, 1));
        assert!(!map.contains(0, -1));
    }
}
