use image::Rgb;

/// 青→灰→赤の発散カラーマップの基準色
const COOLWARM: [(f32, [f32; 3]); 3] = [
    (0.0, [59.0, 76.0, 192.0]),
    (0.5, [221.0, 221.0, 221.0]),
    (1.0, [180.0, 4.0, 38.0]),
];

/// 紫→青緑→黄の知覚的に均一なカラーマップの基準色
const VIRIDIS: [(f32, [f32; 3]); 5] = [
    (0.0, [68.0, 1.0, 84.0]),
    (0.25, [59.0, 82.0, 139.0]),
    (0.5, [33.0, 145.0, 140.0]),
    (0.75, [94.0, 201.0, 98.0]),
    (1.0, [253.0, 231.0, 37.0]),
];

fn interpolate(stops: &[(f32, [f32; 3])], t: f32) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let upper = stops
        .iter()
        .position(|(pos, _)| *pos >= t)
        .unwrap_or(stops.len() - 1)
        .max(1);
    let (p0, c0) = stops[upper - 1];
    let (p1, c1) = stops[upper];
    let local = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };

    let channel = |i: usize| (c0[i] + (c1[i] - c0[i]) * local).round() as u8;
    Rgb([channel(0), channel(1), channel(2)])
}

/// 棒の本数に応じてcoolwarmから等間隔に色を取る
///
/// 両端の極端な色を避けるため、区間を n+1 等分した内側の点を使う。
pub fn coolwarm(n: usize) -> Vec<Rgb<u8>> {
    (0..n)
        .map(|i| interpolate(&COOLWARM, (i as f32 + 1.0) / (n as f32 + 1.0)))
        .collect()
}

/// 0.0〜1.0の位置に対応するviridisの色
pub fn viridis(t: f32) -> Rgb<u8> {
    interpolate(&VIRIDIS, t)
}
