use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{ debug, warn };

use crate::error::{ Error, Result };
use crate::shape::{ Shape, ShapeArena, ShapeId };
use crate::tuple::Tuple4D;

/// A parser for Wavefront OBJ files.
///
/// Supports vertices (`v`), polygonal faces (`f`) and named groups (`g`).
/// Faces become triangles inside the arena the parser was given; anything
/// else is skipped and counted in `ignored_lines`.
///
/// A sample OBJ file may look like the following:
///
/// ```obj
/// v -1 1 0
/// v -1 0 0
/// v 1 0 0
/// v 1 1 0
///
/// g FirstGroup
/// f 1 2 3
/// g SecondGroup
/// f 1 3 4
/// ```
///
/// Note that groups do not nest; in the above example, `SecondGroup` is
/// separate from `FirstGroup` (i.e. `SecondGroup` is not a child group).
#[derive(Clone, Debug)]
pub struct ObjParser {
    /// Number of lines that were skipped as unsupported or unusable.
    pub ignored_lines: usize,

    vertices: Vec<Tuple4D>,
    default_group: ShapeId,
    groups: BTreeMap<String, ShapeId>,
}

impl ObjParser {
    fn new(shapes: &mut ShapeArena) -> ObjParser {
        ObjParser {
            ignored_lines: 0,
            vertices: Vec::new(),
            default_group: shapes.add(Shape::group()),
            groups: BTreeMap::new(),
        }
    }

    /// Parses OBJ source text, adding its triangles and groups to `shapes`.
    ///
    /// # Examples
    ///
    /// ```
    /// use whitted::obj::ObjParser;
    /// use whitted::shape::ShapeArena;
    ///
    /// let mut shapes = ShapeArena::new();
    /// let parser = ObjParser::parse_str(&mut shapes, "
    /// v -1 1 0
    /// v -1 0 0
    /// v 1 0 0
    /// v 1 1 0
    ///
    /// f 1 2 3 4
    /// ").unwrap();
    ///
    /// let group = parser.default_group();
    /// assert_eq!(shapes[group].children().unwrap().len(), 2);
    /// ```
    pub fn parse_str(shapes: &mut ShapeArena, source: &str)
        -> Result<ObjParser> {
        let mut parser = ObjParser::new(shapes);

        // Faces go into the default group until a `g` command names another.
        let mut current_group = parser.default_group;
        for (n, line) in source.lines().enumerate() {
            parser.handle_line(shapes, n + 1, line, &mut current_group)?;
        }

        debug!("parsed OBJ: {} vertices, {} named groups, {} lines ignored",
            parser.vertices.len(), parser.groups.len(), parser.ignored_lines);
        Ok(parser)
    }

    /// Reads and parses an OBJ file. See `parse_str`.
    pub fn parse_file<P: AsRef<Path>>(shapes: &mut ShapeArena, path: P)
        -> Result<ObjParser> {
        debug!("loading OBJ file {}", path.as_ref().display());
        let source = fs::read_to_string(path)?;

        ObjParser::parse_str(shapes, &source)
    }

    /// The group holding faces that appear before any `g` command.
    pub fn default_group(&self) -> ShapeId {
        self.default_group
    }

    /// A named group, if the file declared it.
    pub fn group(&self, name: &str) -> Option<ShapeId> {
        self.groups.get(name).copied()
    }

    pub fn groups(&self) -> &BTreeMap<String, ShapeId> {
        &self.groups
    }

    /// A vertex by its 1-based OBJ index.
    pub fn vertex(&self, index: usize) -> Option<Tuple4D> {
        index.checked_sub(1).and_then(|i| self.vertices.get(i)).copied()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Attaches every named group under the default group, returning the
    /// default group as the root of the whole model.
    pub fn into_group(self, shapes: &mut ShapeArena) -> ShapeId {
        for group in self.groups.values() {
            shapes.add_child(self.default_group, *group);
        }

        self.default_group
    }

    fn ignore(&mut self, n: usize, line: &str, reason: &str) {
        warn!("ignoring OBJ line {} ({}): {}", n, reason, line.trim());
        self.ignored_lines += 1;
    }

    fn handle_line(&mut self, shapes: &mut ShapeArena, n: usize, line: &str,
        current_group: &mut ShapeId) -> Result<()> {
        let params: Vec<&str> = line.split_whitespace().collect();

        match params.as_slice() {
            [] => (),

            ["v", x, y, z, ..] => {
                self.vertices.push(Tuple4D::point(
                    parse_number(n, x)?,
                    parse_number(n, y)?,
                    parse_number(n, z)?,
                ));
            },

            ["f", indices @ ..] => {
                let face = indices.iter()
                    .map(|vertex| parse_vertex_index(n, vertex))
                    .collect::<Result<Vec<usize>>>()?;

                if face.len() < 3 {
                    self.ignore(n, line, "face needs three vertices");
                } else if face.iter().any(|&i| i == 0 || i > self.vertices.len()) {
                    self.ignore(n, line, "face references a missing vertex");
                } else {
                    for triangle in self.fan_triangulation(&face) {
                        let id = shapes.add(triangle);
                        shapes.add_child(*current_group, id);
                    }
                }
            },

            ["g", name, ..] => {
                let name = name.to_string();
                *current_group = *self.groups.entry(name)
                    .or_insert_with(|| shapes.add(Shape::group()));
            },

            _ => self.ignore(n, line, "unsupported command"),
        }

        Ok(())
    }

    /// Partitions a polygon into triangles.
    ///
    /// This is done with something called a "fan triangulation." Observe the
    /// following diagram:
    ///
    /// ```text
    ///         B *
    ///          / \
    ///         /   \
    ///        /     \
    ///     A *       * C
    ///       |       |
    ///       |       |
    ///       |       |
    ///     E * ----- * D
    /// ```
    ///
    /// Starting at `A`, we make a triangle `A-B-C`, then `A-C-D`, and finally
    /// `A-D-E`. The first vertex stays fixed and "rides" the edges of the
    /// shape. This only works for convex polygons.
    ///
    /// `face` holds 1-based vertex indices, already checked to be in range.
    fn fan_triangulation(&self, face: &[usize]) -> Vec<Shape> {
        let v = |i: usize| self.vertices[face[i] - 1];

        (1..(face.len() - 1))
            .map(|i| Shape::triangle(v(0), v(i), v(i + 1)))
            .collect()
    }
}

fn parse_number(line: usize, token: &str) -> Result<f64> {
    token.parse().map_err(|_| Error::ObjParse {
        line,
        message: format!("invalid number {:?}", token),
    })
}

/// Parses the vertex part of a face element: `i`, `i/t`, `i//n` or `i/t/n`.
fn parse_vertex_index(line: usize, token: &str) -> Result<usize> {
    let index = token.split('/').next().unwrap_or(token);

    index.parse().map_err(|_| Error::ObjParse {
        line,
        message: format!("invalid vertex index {:?}", token),
    })
}

#[test]
fn ignoring_unrecognized_lines() {
    let gibberish = "There was a young lady named Bright
who traveled much faster than light.
She set out one day
in a relative way,
and came back the previous night.";

    let mut shapes = ShapeArena::new();
    let parser = ObjParser::parse_str(&mut shapes, gibberish).unwrap();

    assert_eq!(parser.ignored_lines, 5);
}

#[test]
fn vertex_records() {
    let source = "v -1 1 0\nv -1.0000 0.5000 0.0000\nv 1 0 0\nv 1 1 0\n";

    let mut shapes = ShapeArena::new();
    let parser = ObjParser::parse_str(&mut shapes, source).unwrap();

    assert_eq!(parser.vertex_count(), 4);
    assert_eq!(parser.vertex(1), Some(Tuple4D::point(-1.0, 1.0, 0.0)));
    assert_eq!(parser.vertex(2), Some(Tuple4D::point(-1.0, 0.5, 0.0)));
    assert_eq!(parser.vertex(3), Some(Tuple4D::point( 1.0, 0.0, 0.0)));
    assert_eq!(parser.vertex(4), Some(Tuple4D::point( 1.0, 1.0, 0.0)));
    assert_eq!(parser.vertex(0), None);
    assert_eq!(parser.vertex(5), None);
}

#[test]
fn parsing_triangle_faces() {
    let source = "
v -1 1 0
v -1 0 0
v 1 0 0
v 1 1 0

f 1 2 3
f 1 3 4
";

    let mut shapes = ShapeArena::new();
    let parser = ObjParser::parse_str(&mut shapes, source).unwrap();
    let children = shapes[parser.default_group()].children().unwrap();

    let t1 = shapes[children[0]].triangle_info().unwrap();
    let t2 = shapes[children[1]].triangle_info().unwrap();

    assert_eq!(t1.p1, parser.vertex(1).unwrap());
    assert_eq!(t1.p2, parser.vertex(2).unwrap());
    assert_eq!(t1.p3, parser.vertex(3).unwrap());
    assert_eq!(t2.p1, parser.vertex(1).unwrap());
    assert_eq!(t2.p2, parser.vertex(3).unwrap());
    assert_eq!(t2.p3, parser.vertex(4).unwrap());
}

#[test]
fn triangulating_polygons() {
    let source = "
v -1 1 0
v -1 0 0
v 1 0 0
v 1 1 0
v 0 2 0

f 1 2 3 4 5
";

    let mut shapes = ShapeArena::new();
    let parser = ObjParser::parse_str(&mut shapes, source).unwrap();
    let children = shapes[parser.default_group()].children().unwrap();
    assert_eq!(children.len(), 3);

    let expected = [(1, 2, 3), (1, 3, 4), (1, 4, 5)];
    for (child, (a, b, c)) in children.iter().zip(expected.iter()) {
        let t = shapes[*child].triangle_info().unwrap();

        assert_eq!(t.p1, parser.vertex(*a).unwrap());
        assert_eq!(t.p2, parser.vertex(*b).unwrap());
        assert_eq!(t.p3, parser.vertex(*c).unwrap());
    }
}

#[test]
fn faces_with_texture_and_normal_indices() {
    let source = "
v 0 1 0
v -1 0 0
v 1 0 0

f 1/1/3 2/2/1 3/3/2
f 1//3 2//1 3//2
";

    let mut shapes = ShapeArena::new();
    let parser = ObjParser::parse_str(&mut shapes, source).unwrap();
    let children = shapes[parser.default_group()].children().unwrap();

    let t1 = shapes[children[0]].triangle_info().unwrap();
    let t2 = shapes[children[1]].triangle_info().unwrap();
    assert_eq!(t1.p1, parser.vertex(1).unwrap());
    assert_eq!(t1.p2, parser.vertex(2).unwrap());
    assert_eq!(t1.p3, parser.vertex(3).unwrap());
    assert_eq!(t1, t2);
}

#[test]
fn triangles_in_groups() {
    let source = "
v -1 1 0
v -1 0 0
v 1 0 0
v 1 1 0

g FirstGroup
f 1 2 3
g SecondGroup
f 1 3 4
";

    let mut shapes = ShapeArena::new();
    let parser = ObjParser::parse_str(&mut shapes, source).unwrap();

    let g1 = parser.group("FirstGroup").unwrap();
    let g2 = parser.group("SecondGroup").unwrap();
    let t1 = shapes[shapes[g1].children().unwrap()[0]].triangle_info().unwrap();
    let t2 = shapes[shapes[g2].children().unwrap()[0]].triangle_info().unwrap();

    assert_eq!(t1.p1, parser.vertex(1).unwrap());
    assert_eq!(t1.p3, parser.vertex(3).unwrap());
    assert_eq!(t2.p2, parser.vertex(3).unwrap());
    assert_eq!(t2.p3, parser.vertex(4).unwrap());
    assert!(shapes[parser.default_group()].children().unwrap().is_empty());
}

#[test]
fn converting_a_model_to_a_group() {
    let source = "
v -1 1 0
v -1 0 0
v 1 0 0
v 1 1 0

g FirstGroup
f 1 2 3
g SecondGroup
f 1 3 4
";

    let mut shapes = ShapeArena::new();
    let parser = ObjParser::parse_str(&mut shapes, source).unwrap();
    let (g1, g2) = (
        parser.group("FirstGroup").unwrap(),
        parser.group("SecondGroup").unwrap(),
    );
    let root = parser.into_group(&mut shapes);

    assert_eq!(shapes[root].children(), Some(&[g1, g2][..]));
    assert_eq!(shapes[g1].parent(), Some(root));
}

#[test]
fn faces_with_missing_vertices_are_ignored() {
    let source = "v 0 1 0\nv -1 0 0\nv 1 0 0\nf 1 2 4\nf 0 1 2\nf 1 2\n";

    let mut shapes = ShapeArena::new();
    let parser = ObjParser::parse_str(&mut shapes, source).unwrap();

    assert_eq!(parser.ignored_lines, 3);
    assert!(shapes[parser.default_group()].children().unwrap().is_empty());
}

#[test]
fn malformed_numbers_are_errors() {
    let mut shapes = ShapeArena::new();

    match ObjParser::parse_str(&mut shapes, "v 1 0 0\nv 1 zero 0\n") {
        Err(Error::ObjParse { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected a parse error, got {:?}", other),
    }

    assert!(ObjParser::parse_str(&mut shapes, "v 1 0 0\nf 1 x 1\n").is_err());
}

#[test]
fn parsing_a_model_file() {
    let mut shapes = ShapeArena::new();
    let parser = ObjParser::parse_file(&mut shapes, "models/two-triangles.obj")
        .unwrap();

    assert_eq!(parser.vertex_count(), 4);
    assert_eq!(parser.ignored_lines, 1);
    assert_eq!(shapes[parser.group("Square").unwrap()].children().unwrap().len(), 2);
}

#[test]
fn missing_model_file_is_an_io_error() {
    let mut shapes = ShapeArena::new();

    assert!(matches!(
        ObjParser::parse_file(&mut shapes, "models/does-not-exist.obj"),
        Err(Error::Io(_))
    ));
}
