//! Integer Bresenham line interpolation.

/// Walk the Bresenham line from (x0, y0) to (x1, y1), calling `plot` at
/// every step including both endpoints.
///
/// The visited path is 8-connected: consecutive points differ by at most
/// one pixel in each axis. When start equals end, `plot` is called exactly
/// once.
pub fn walk<F: FnMut(i32, i32)>(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: F) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        plot(x, y);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
