//! 三维二值掩膜的连通域 (26-邻接). 二维切片可通过补一个长度为 1 的轴使用,
//! 此时等价于 8-邻接.

use crate::{Area3d, Areas3d, Idx3d};
use ndarray::{Array3, ArrayView3};
use std::collections::VecDeque;

/// 由标签视图生成值为 `label` 的二值掩膜.
#[inline]
pub fn mask_of(view: ArrayView3<u8>, label: u8) -> Array3<bool> {
    view.mapv(|p| p == label)
}

/// 获得 `pos` 的 26-邻域索引. 保证返回的索引都不越界.
fn neighbour26((x, y, z): Idx3d, (nx, ny, nz): Idx3d) -> impl Iterator<Item = Idx3d> {
    const D: [isize; 3] = [-1, 0, 1];
    D.into_iter()
        .flat_map(|dx| D.into_iter().flat_map(move |dy| D.into_iter().map(move |dz| (dx, dy, dz))))
        .filter(|&d| d != (0, 0, 0))
        .filter_map(move |(dx, dy, dz)| {
            let p = (
                x.checked_add_signed(dx)?,
                y.checked_add_signed(dy)?,
                z.checked_add_signed(dz)?,
            );
            (p.0 < nx && p.1 < ny && p.2 < nz).then_some(p)
        })
}

/// 按照 26-相邻规则获取所有前景区域. 区域按其首个体素的行优先序排列.
pub fn components(mask: ArrayView3<bool>) -> Areas3d {
    let dim = mask.dim();
    let mut visited = Array3::from_elem(dim, false);
    let mut ans = Areas3d::new();
    let mut bfs_q = VecDeque::with_capacity(16);

    for (pos, &fg) in mask.indexed_iter() {
        if !fg || visited[pos] {
            continue;
        }
        visited[pos] = true;
        bfs_q.push_back(pos);
        let mut this_area = Area3d::with_capacity(1);
        while let Some(cur) = bfs_q.pop_front() {
            this_area.push(cur);
            for neigh in neighbour26(cur, dim) {
                if mask[neigh] && !visited[neigh] {
                    visited[neigh] = true;
                    bfs_q.push_back(neigh);
                }
            }
        }
        ans.push(this_area);
    }
    ans
}

/// 由区域集合重建掩膜.
fn paint<'a, I: IntoIterator<Item = &'a Area3d>>(dim: Idx3d, areas: I) -> Array3<bool> {
    let mut out = Array3::from_elem(dim, false);
    for pos in areas.into_iter().flatten() {
        out[*pos] = true;
    }
    out
}

/// 仅保留最大的连通域. 多个同为最大时保留最先出现的那个. 全背景时返回全背景.
pub fn largest(mask: ArrayView3<bool>) -> Array3<bool> {
    let areas = components(mask);
    paint(mask.dim(), areas.iter().rev().max_by_key(|a| a.len()))
}

/// 去除体素数小于 `thres` 的连通域.
pub fn remove_small(mask: ArrayView3<bool>, thres: usize) -> Array3<bool> {
    let areas = components(mask);
    paint(mask.dim(), areas.iter().filter(|a| a.len() >= thres))
}

/// 统计体素数大于 `thres` 的连通域个数.
pub fn count_large(mask: ArrayView3<bool>, thres: usize) -> usize {
    components(mask).iter().filter(|a| a.len() > thres).count()
}
