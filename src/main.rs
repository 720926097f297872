//-
// Copyright (c) 2026, the spf-breakdown authors
//
// This file is part of spf-breakdown.
//
// spf-breakdown is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// spf-breakdown is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along
// with spf-breakdown. If not, see <http://www.gnu.org/licenses/>.

fn main() {
    spf_breakdown::cli::main::main()
}
